//! The raw user-facing configuration model.
//!
//! This is what `lantern.toml` deserializes into, before `extends`
//! expansion and normalization. Everything is optional; a missing file is
//! equivalent to `UserConfig::default()`.

use crate::error::{ConfigurationError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default scan timeout in seconds.
pub const DEFAULT_HINTS_TIMEOUT_SECS: u64 = 120;

/// Default number of targets analyzed concurrently.
pub const DEFAULT_MAX_CONCURRENT_TARGETS: usize = 1;

/// A hint entry in the config: either a bare severity string or a detailed
/// table with severity and hint-specific options.
///
/// ```toml
/// [hints]
/// "meta-charset-utf8" = "error"
/// "no-disallowed-headers" = { severity = "warning", options = { disallow = ["server"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HintSetting {
    /// Just a severity (or `"off"` to disable)
    Severity(String),
    /// Severity plus options
    Detailed {
        /// Severity string, same values as the bare form
        severity: String,
        /// Hint-specific options, validated against the hint's schema later
        #[serde(default)]
        options: toml::Table,
    },
}

impl HintSetting {
    /// The severity string, whichever form was used.
    #[must_use]
    pub fn severity(&self) -> &str {
        match self {
            Self::Severity(s) => s,
            Self::Detailed { severity, .. } => severity,
        }
    }

    /// The options table, empty for the bare form.
    #[must_use]
    pub fn options(&self) -> Option<&toml::Table> {
        match self {
            Self::Severity(_) => None,
            Self::Detailed { options, .. } => Some(options),
        }
    }
}

/// Connector selection and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Connector name, resolved against the resource registry
    pub name: String,
    /// Connector-specific options
    pub options: toml::Table,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            name: "http".to_string(),
            options: toml::Table::new(),
        }
    }
}

/// One ignored-URL entry: a regex over resource URLs, optionally scoped to
/// specific hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredUrl {
    /// Regex matched against resource URLs
    pub pattern: String,
    /// Hints the pattern applies to; empty means all hints
    #[serde(default)]
    pub hints: Vec<String>,
}

/// The raw configuration as written by the user.
///
/// Later sources override earlier ones key-by-key during resolution, except
/// the hint map, which merges additively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Base configs to extend: built-in preset names or paths to TOML files
    pub extends: Vec<String>,
    /// Hint severities and options, keyed by hint identifier
    pub hints: BTreeMap<String, HintSetting>,
    /// Connector selection
    pub connector: ConnectorConfig,
    /// Parsers to load; empty means all built-ins
    pub parsers: Vec<String>,
    /// Formatters to apply, in order; empty means `summary`
    pub formatters: Vec<String>,
    /// Browser target queries, such as `"chrome >= 100"` or `"defaults"`
    pub browsers: Vec<String>,
    /// URL patterns excluded from reporting
    pub ignored_urls: Vec<IgnoredUrl>,
    /// Scan timeout in seconds
    pub hints_timeout_secs: Option<u64>,
    /// How many targets run concurrently in a multi-target analysis
    pub max_concurrent_targets: Option<usize>,
    /// Severity at or above which a scan is considered failing
    pub fail_threshold: Option<String>,
    /// BCP 47 language tag handed to hints
    pub language: Option<String>,
}

impl UserConfig {
    /// Load a config from an explicit TOML file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigurationError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Discover and load a config file.
    ///
    /// Order: explicit path if given, then `lantern.toml` in the working
    /// directory, then the per-user config directory. A missing file at every
    /// location resolves to defaults; a present-but-malformed file is an
    /// error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading explicit config file");
            return Self::from_file(path);
        }

        let local = PathBuf::from("lantern.toml");
        if local.exists() {
            tracing::debug!(path = %local.display(), "loading config from working directory");
            return Self::from_file(&local);
        }

        let user_path = Self::user_config_path()?;
        if user_path.exists() {
            tracing::debug!(path = %user_path.display(), "loading config from user directory");
            return Self::from_file(&user_path);
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Path of the per-user config file.
    pub fn user_config_path() -> Result<PathBuf> {
        let dirs =
            ProjectDirs::from("dev", "lantern", "lantern").ok_or(ConfigurationError::NoConfigDir)?;
        Ok(dirs.config_dir().join("lantern.toml"))
    }
}
