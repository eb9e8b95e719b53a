//! Scan-level failures.
//!
//! These surface through `Engine::analyze`'s future; by the time the caller
//! sees one, `scan::end` has already been emitted with a failure payload and
//! the connector has been closed.

use lantern_events::DispatchError;
use lantern_resources::ConnectorError;
use std::time::Duration;
use thiserror::Error;

/// Errors from one scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan exceeded the configured hints timeout
    #[error("scan timed out after {limit:?}")]
    Timeout {
        /// The configured limit
        limit: Duration,
    },

    /// A hint or parser listener failed during an awaited dispatch
    #[error("listener failed during scan: {0}")]
    Listener(#[source] DispatchError),

    /// The connector's collection failed
    #[error("connector failed: {0}")]
    Connector(#[source] ConnectorError),

    /// The scan was cancelled externally
    #[error("scan was cancelled")]
    Cancelled,
}

impl ScanError {
    /// Classify a connector failure: dispatch failures inside the connector
    /// are listener errors, everything else is the connector's own.
    pub(crate) fn from_collect(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Dispatch(dispatch) => Self::Listener(dispatch),
            other => Self::Connector(other),
        }
    }
}
