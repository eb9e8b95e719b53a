//! Configuration errors.
//!
//! Everything that can go wrong between a raw config file and a
//! [`crate::ResolvedConfiguration`] is a typed variant here, raised before
//! any scan starts.

use thiserror::Error;

/// Errors from loading or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The platform config directory could not be determined
    #[error("could not determine a configuration directory for this platform")]
    NoConfigDir,

    /// A config file exists but could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A config file exists but is not valid TOML
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed to parse
        path: String,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// An `extends` entry names neither a built-in preset nor a readable file
    #[error("unknown extends reference '{reference}': not a built-in preset or config file")]
    UnknownExtends {
        /// The offending reference
        reference: String,
    },

    /// The `extends` chain loops back on itself
    #[error("circular extends chain: {chain}")]
    CircularExtends {
        /// Human-readable chain, such as `a -> b -> a`
        chain: String,
    },

    /// A severity string is not `off`, `hint`, `warning`, or `error`
    #[error("unknown severity '{value}' for hint '{hint}', expected off, hint, warning, or error")]
    UnknownSeverity {
        /// Hint the severity was set for
        hint: String,
        /// The offending value
        value: String,
    },

    /// A hint identifier does not satisfy the identifier grammar
    #[error("invalid hint identifier '{hint}': {reason}")]
    InvalidHintId {
        /// The offending identifier
        hint: String,
        /// Why it was rejected
        reason: String,
    },

    /// A browser target query could not be parsed
    #[error("invalid browser query '{query}': {reason}")]
    InvalidBrowserQuery {
        /// The offending query
        query: String,
        /// Why it was rejected
        reason: String,
    },

    /// A browser query resolved to nothing
    #[error("browser query '{query}' resolved to an empty browser list")]
    EmptyBrowserQuery {
        /// The offending query
        query: String,
    },

    /// An ignored-URL pattern is not a valid regex
    #[error("invalid ignored URL pattern '{pattern}': {reason}")]
    InvalidIgnorePattern {
        /// The offending pattern
        pattern: String,
        /// Regex compile error text
        reason: String,
    },

    /// A numeric limit is out of its accepted range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The config field
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigurationError::CircularExtends {
            chain: "a -> b -> a".to_string(),
        };
        assert_eq!(err.to_string(), "circular extends chain: a -> b -> a");

        let err = ConfigurationError::UnknownSeverity {
            hint: "minified-js".to_string(),
            value: "critical".to_string(),
        };
        assert!(err.to_string().contains("critical"));
        assert!(err.to_string().contains("minified-js"));
    }
}
