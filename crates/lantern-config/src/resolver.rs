//! Configuration resolution: extends expansion, merging, normalization.
//!
//! Resolution turns a raw [`UserConfig`] into a [`ResolvedConfiguration`]:
//! `extends` chains are expanded transitively (with cycle detection),
//! severities normalize to the ordinal enum, browser queries resolve to
//! concrete identifiers, and ignore patterns compile to regexes. All of this
//! happens before any scan starts, so every failure here is a typed
//! [`ConfigurationError`].

use crate::browsers::resolve_browsers;
use crate::error::{ConfigurationError, Result};
use crate::presets::preset;
use crate::user_config::{
    ConnectorConfig, UserConfig, DEFAULT_HINTS_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_TARGETS,
};
use lantern_core::{HintId, Severity};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Resolved per-hint configuration.
#[derive(Debug, Clone)]
pub struct HintConfig {
    /// Whether the hint runs at all (`"off"` disables)
    pub enabled: bool,
    /// Severity problems from this hint are recorded at
    pub severity: Severity,
    /// Options handed to the hint, validated against its schema at
    /// analyzer creation
    pub options: serde_json::Value,
}

/// Resolved connector selection.
#[derive(Debug, Clone)]
pub struct ResolvedConnector {
    /// Connector name looked up in the resource registry
    pub name: String,
    /// Connector options as JSON
    pub options: serde_json::Value,
}

/// One compiled ignore pattern, optionally scoped to specific hints.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    /// Compiled URL regex
    pub regex: Regex,
    /// Hints the pattern applies to; empty means all hints
    pub hints: Vec<HintId>,
}

impl IgnorePattern {
    /// Whether this pattern suppresses reports from `hint` on `resource`.
    #[must_use]
    pub fn applies(&self, resource: &str, hint: &HintId) -> bool {
        self.regex.is_match(resource) && (self.hints.is_empty() || self.hints.contains(hint))
    }
}

/// The fully resolved configuration one analyzer runs with.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    /// Per-hint settings, keyed by validated identifier
    pub hints: BTreeMap<HintId, HintConfig>,
    /// Connector selection
    pub connector: ResolvedConnector,
    /// Parsers to load; empty means all registered parsers
    pub parsers: Vec<String>,
    /// Formatters to apply, in order
    pub formatters: Vec<String>,
    /// Concrete browser identifiers from the target queries
    pub browsers: Vec<String>,
    /// Compiled ignore patterns
    pub ignored_urls: Vec<IgnorePattern>,
    /// Hard scan timeout
    pub hints_timeout: Duration,
    /// Bound on concurrent targets in a multi-target run
    pub max_concurrent_targets: usize,
    /// Severity at or above which a scan fails
    pub fail_threshold: Severity,
    /// Language tag handed to hints
    pub language: String,
}

impl ResolvedConfiguration {
    /// Whether a problem from `hint` on `resource` is globally ignored.
    #[must_use]
    pub fn is_ignored(&self, resource: &str, hint: &HintId) -> bool {
        self.ignored_urls
            .iter()
            .any(|pattern| pattern.applies(resource, hint))
    }

    /// Identifiers of hints that are enabled.
    #[must_use]
    pub fn enabled_hints(&self) -> Vec<HintId> {
        self.hints
            .iter()
            .filter(|(_, config)| config.enabled)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Resolve a raw config into a [`ResolvedConfiguration`].
///
/// `base_dir` anchors relative paths in `extends`; it is typically the
/// directory of the file `raw` was loaded from, or the working directory for
/// programmatic configs.
pub fn resolve(raw: &UserConfig, base_dir: Option<&Path>) -> Result<ResolvedConfiguration> {
    let mut chain = Vec::new();
    let merged = expand(raw, base_dir, &mut chain)?;
    normalize(&merged)
}

/// Expand the `extends` chain of `config` depth-first and merge everything
/// into one raw config. `chain` tracks the references currently being
/// expanded for cycle detection.
fn expand(config: &UserConfig, base_dir: Option<&Path>, chain: &mut Vec<String>) -> Result<UserConfig> {
    let mut merged = UserConfig::default();

    for reference in &config.extends {
        let key = canonical_key(reference, base_dir);
        if chain.contains(&key) {
            let mut cycle = chain.clone();
            cycle.push(key);
            return Err(ConfigurationError::CircularExtends {
                chain: cycle.join(" -> "),
            });
        }

        let (base, base_base_dir) = load_reference(reference, base_dir)?;
        debug!(reference = %reference, "expanding extends reference");

        chain.push(key);
        let expanded = expand(&base, base_base_dir.as_deref(), chain)?;
        chain.pop();

        merged = merge(merged, expanded);
    }

    let mut own = config.clone();
    own.extends.clear();
    Ok(merge(merged, own))
}

/// A stable identity for an extends reference: the preset name, or the
/// canonicalized file path.
fn canonical_key(reference: &str, base_dir: Option<&Path>) -> String {
    if preset(reference).is_some() {
        return format!("preset:{reference}");
    }
    let path = anchored_path(reference, base_dir);
    path.canonicalize()
        .unwrap_or(path)
        .display()
        .to_string()
}

fn anchored_path(reference: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(reference);
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

/// Load an extends reference: a built-in preset or another TOML file.
/// Returns the config plus the directory anchoring its own relative
/// references.
fn load_reference(
    reference: &str,
    base_dir: Option<&Path>,
) -> Result<(UserConfig, Option<PathBuf>)> {
    if let Some(config) = preset(reference) {
        return Ok((config, None));
    }

    let path = anchored_path(reference, base_dir);
    if !path.exists() {
        return Err(ConfigurationError::UnknownExtends {
            reference: reference.to_string(),
        });
    }

    let config = UserConfig::from_file(&path)?;
    let parent = path.parent().map(Path::to_path_buf);
    Ok((config, parent))
}

/// Merge `overlay` on top of `base`.
///
/// Scalar and list fields override key-by-key when the overlay sets them;
/// the hint map merges additively, with overlay entries replacing same-named
/// base entries and unnamed hints inheriting from the base.
fn merge(mut base: UserConfig, overlay: UserConfig) -> UserConfig {
    for (hint, setting) in overlay.hints {
        base.hints.insert(hint, setting);
    }

    if overlay.connector != ConnectorConfig::default() {
        base.connector = overlay.connector;
    }
    if !overlay.parsers.is_empty() {
        base.parsers = overlay.parsers;
    }
    if !overlay.formatters.is_empty() {
        base.formatters = overlay.formatters;
    }
    if !overlay.browsers.is_empty() {
        base.browsers = overlay.browsers;
    }
    if !overlay.ignored_urls.is_empty() {
        base.ignored_urls = overlay.ignored_urls;
    }
    if overlay.hints_timeout_secs.is_some() {
        base.hints_timeout_secs = overlay.hints_timeout_secs;
    }
    if overlay.max_concurrent_targets.is_some() {
        base.max_concurrent_targets = overlay.max_concurrent_targets;
    }
    if overlay.fail_threshold.is_some() {
        base.fail_threshold = overlay.fail_threshold;
    }
    if overlay.language.is_some() {
        base.language = overlay.language;
    }

    base
}

/// Normalize a fully merged raw config into the resolved form.
fn normalize(raw: &UserConfig) -> Result<ResolvedConfiguration> {
    let mut hints = BTreeMap::new();
    for (name, setting) in &raw.hints {
        let id = HintId::new(name.clone()).map_err(|e| ConfigurationError::InvalidHintId {
            hint: name.clone(),
            reason: e.to_string(),
        })?;
        let (enabled, severity) = parse_severity(name, setting.severity())?;
        let options = setting
            .options()
            .map_or(serde_json::Value::Null, |table| toml_to_json(table.clone()));
        hints.insert(
            id,
            HintConfig {
                enabled,
                severity,
                options,
            },
        );
    }

    let fail_threshold = match raw.fail_threshold.as_deref() {
        None => Severity::Error,
        Some(value) => {
            value
                .parse()
                .map_err(|_| ConfigurationError::UnknownSeverity {
                    hint: "fail_threshold".to_string(),
                    value: value.to_string(),
                })?
        }
    };

    let timeout_secs = raw.hints_timeout_secs.unwrap_or(DEFAULT_HINTS_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "hints_timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let max_concurrent_targets = raw
        .max_concurrent_targets
        .unwrap_or(DEFAULT_MAX_CONCURRENT_TARGETS);
    if max_concurrent_targets == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "max_concurrent_targets".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let mut ignored_urls = Vec::with_capacity(raw.ignored_urls.len());
    for entry in &raw.ignored_urls {
        let regex =
            Regex::new(&entry.pattern).map_err(|e| ConfigurationError::InvalidIgnorePattern {
                pattern: entry.pattern.clone(),
                reason: e.to_string(),
            })?;
        let mut scoped = Vec::with_capacity(entry.hints.len());
        for hint in &entry.hints {
            scoped.push(
                HintId::new(hint.clone()).map_err(|e| ConfigurationError::InvalidHintId {
                    hint: hint.clone(),
                    reason: e.to_string(),
                })?,
            );
        }
        ignored_urls.push(IgnorePattern {
            regex,
            hints: scoped,
        });
    }

    let mut formatters = raw.formatters.clone();
    if formatters.is_empty() {
        formatters.push("summary".to_string());
    }

    Ok(ResolvedConfiguration {
        hints,
        connector: ResolvedConnector {
            name: raw.connector.name.clone(),
            options: toml_to_json(raw.connector.options.clone()),
        },
        parsers: raw.parsers.clone(),
        formatters,
        browsers: resolve_browsers(&raw.browsers)?,
        ignored_urls,
        hints_timeout: Duration::from_secs(timeout_secs),
        max_concurrent_targets,
        fail_threshold,
        language: raw.language.clone().unwrap_or_else(|| "en".to_string()),
    })
}

/// Parse a severity string: `"off"` disables the hint, the three ordinals
/// enable it, anything else is an error.
fn parse_severity(hint: &str, value: &str) -> Result<(bool, Severity)> {
    if value == "off" {
        return Ok((false, Severity::default()));
    }
    value
        .parse()
        .map(|severity| (true, severity))
        .map_err(|_| ConfigurationError::UnknownSeverity {
            hint: hint.to_string(),
            value: value.to_string(),
        })
}

/// Convert a TOML table into the JSON value hints and connectors consume.
fn toml_to_json(table: toml::Table) -> serde_json::Value {
    fn value(v: toml::Value) -> serde_json::Value {
        match v {
            toml::Value::String(s) => serde_json::Value::String(s),
            toml::Value::Integer(i) => serde_json::Value::from(i),
            toml::Value::Float(f) => {
                serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
            toml::Value::Boolean(b) => serde_json::Value::Bool(b),
            toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(value).collect())
            }
            toml::Value::Table(t) => {
                serde_json::Value::Object(t.into_iter().map(|(k, v)| (k, value(v))).collect())
            }
        }
    }

    serde_json::Value::Object(table.into_iter().map(|(k, v)| (k, value(v))).collect())
}
