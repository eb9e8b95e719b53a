//! Lantern Engine - the per-scan orchestrator.
//!
//! One [`Engine`] runs one scan: it owns the event bus, wires the loaded
//! parsers and hints to it, drives the connector, enforces the timeout and
//! cancellation contract, and returns everything reported in order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod engine;
pub mod error;
mod sink;

pub use engine::{Engine, FETCH_ERROR_HINT_ID};
pub use error::ScanError;
