//! Connector-facing error type.
//!
//! Connectors are pluggable; their failures cross the engine boundary
//! through this enum. Per-resource fetch failures are usually reported as
//! `fetch::error` events instead of errors — these variants cover the cases
//! that stop a connector from proceeding at all.

use thiserror::Error;

/// Errors from connector operations.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The connector cannot evaluate scripts in a page context
    #[error("connector '{connector}' does not support script evaluation")]
    EvaluationUnsupported {
        /// Connector name
        connector: String,
    },

    /// The target itself could not be reached; the scan cannot proceed
    #[error("target '{target}' is unreachable: {message}")]
    TargetUnreachable {
        /// The target URL
        target: String,
        /// What went wrong
        message: String,
    },

    /// A non-target resource fetch failed where an error return was
    /// required (`fetch_content`); during collection the same failure is a
    /// `fetch::error` event
    #[error("failed to fetch '{resource}': {message}")]
    Fetch {
        /// The resource URL
        resource: String,
        /// What went wrong
        message: String,
    },

    /// The target URL is not one this connector handles
    #[error("connector '{connector}' cannot handle target '{target}': {reason}")]
    UnsupportedTarget {
        /// Connector name
        connector: String,
        /// The target URL
        target: String,
        /// Why it was rejected
        reason: String,
    },

    /// The connector options failed to deserialize
    #[error("invalid connector options: {message}")]
    InvalidOptions {
        /// What went wrong
        message: String,
    },

    /// A listener failed during an awaited dispatch the connector performed
    #[error(transparent)]
    Dispatch(#[from] lantern_events::DispatchError),

    /// I/O error outside a single resource fetch
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for connector operations.
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConnectorError::EvaluationUnsupported {
            connector: "local".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "connector 'local' does not support script evaluation"
        );

        let err = ConnectorError::TargetUnreachable {
            target: "https://example.invalid/".to_string(),
            message: "dns error".to_string(),
        };
        assert!(err.to_string().contains("unreachable"));
    }
}
