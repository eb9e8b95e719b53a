//! Built-in base configurations referenced by name from `extends`.

use crate::user_config::{HintSetting, UserConfig};

/// Names of all built-in presets.
pub const PRESET_NAMES: &[&str] = &["recommended", "development"];

/// Look up a built-in preset by name.
#[must_use]
pub fn preset(name: &str) -> Option<UserConfig> {
    match name {
        "recommended" => Some(recommended()),
        "development" => Some(development()),
        _ => None,
    }
}

/// The recommended baseline: every built-in hint enabled at its production
/// severity.
fn recommended() -> UserConfig {
    let mut config = UserConfig::default();
    for (hint, severity) in [
        ("meta-charset-utf8", "warning"),
        ("no-disallowed-headers", "warning"),
        ("no-protocol-relative-urls", "error"),
        ("minified-js", "hint"),
    ] {
        config
            .hints
            .insert(hint.to_string(), HintSetting::Severity(severity.to_string()));
    }
    config.browsers = vec!["defaults".to_string()];
    config.fail_threshold = Some("error".to_string());
    config
}

/// The development baseline: production-only concerns downgraded so local
/// iteration stays quiet.
fn development() -> UserConfig {
    let mut config = recommended();
    config
        .hints
        .insert("minified-js".to_string(), HintSetting::Severity("off".to_string()));
    config.hints.insert(
        "no-disallowed-headers".to_string(),
        HintSetting::Severity("hint".to_string()),
    );
    config
}
