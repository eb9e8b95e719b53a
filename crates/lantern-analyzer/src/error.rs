//! Analyzer-level failures.
//!
//! Everything here is raised before or between scans and carries enough
//! structure for a host to offer remediation; mid-scan failures are
//! [`ScanError`]s wrapped with the target they belong to.

use lantern_config::ConfigurationError;
use lantern_engine::ScanError;
use thiserror::Error;

/// Errors from creating or running an analyzer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Configuration could not be resolved
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Configured resources could not all be loaded
    #[error("unresolved resources (missing: {missing:?}, incompatible: {incompatible:?})")]
    Resources {
        /// Names not registered at all
        missing: Vec<String>,
        /// Names registered at an incompatible core API version
        incompatible: Vec<String>,
    },

    /// Hint options failed their declared schemas
    #[error("invalid hint options: {}", violations.join("; "))]
    Hints {
        /// One entry per violation, `<hint>: <field>: <message>`
        violations: Vec<String>,
    },

    /// The connector rejected its configuration
    #[error("invalid connector configuration: {message}")]
    Connector {
        /// What the connector reported
        message: String,
    },

    /// A target URL could not be parsed
    #[error("invalid target '{target}': {message}")]
    InvalidTarget {
        /// The offending input
        target: String,
        /// Why it was rejected
        message: String,
    },

    /// A scan failed mid-run
    #[error("scan of '{target}' failed: {source}")]
    Scan {
        /// The target whose scan failed
        target: String,
        /// The underlying scan failure
        source: ScanError,
    },
}

/// Errors from a watch session.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Watch mode only works with the `local` connector
    #[error("watch mode requires the 'local' connector, not '{connector}'")]
    UnsupportedConnector {
        /// The configured connector
        connector: String,
    },

    /// The watch target is not a local path
    #[error("cannot watch '{target}': {message}")]
    Target {
        /// The target URL
        target: String,
        /// Why it cannot be watched
        message: String,
    },

    /// The filesystem watcher failed unrecoverably
    #[error("filesystem watcher failed: {message}")]
    Watcher {
        /// What the watcher reported
        message: String,
    },

    /// A rescan triggered by a change failed
    #[error("rescan of '{target}' failed: {source}")]
    Scan {
        /// The resource being rescanned
        target: String,
        /// The underlying scan failure
        source: ScanError,
    },
}
