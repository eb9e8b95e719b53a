//! Core error types for the Lantern engine.
//!
//! This module defines the central error type used across all subsystems.
//! Each subsystem error is represented as a variant for clear error
//! propagation. Subsystem crates define richer typed errors of their own and
//! convert into these variants at crate boundaries.

use thiserror::Error;

/// Central error type for all Lantern operations.
///
/// Each variant represents an error from a specific subsystem, allowing
/// for clear error propagation and handling across module boundaries.
#[derive(Error, Debug)]
pub enum LanternError {
    /// Configuration errors (file loading, parsing, resolution)
    #[error("configuration error: {0}")]
    Config(String),

    /// Resource loading errors (registry lookups, compatibility)
    #[error("resource error: {0}")]
    Resource(String),

    /// Connector errors (collection, fetching, traversal)
    #[error("connector error: {0}")]
    Connector(String),

    /// Parser errors (malformed content, selector failures)
    #[error("parse error: {0}")]
    Parse(String),

    /// Scan errors (timeouts, listener failures, cancellation)
    #[error("scan error: {0}")]
    Scan(String),

    /// Watch mode errors (filesystem notification failures)
    #[error("watch error: {0}")]
    Watch(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using `LanternError`.
pub type Result<T> = std::result::Result<T, LanternError>;
