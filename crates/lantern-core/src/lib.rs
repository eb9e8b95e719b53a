//! Lantern Core - shared data model for the Lantern analysis engine.
//!
//! This crate defines the types every other Lantern crate speaks in:
//! severities and reported problems, fetched network data, the arena-based
//! DOM snapshot, resource/hint identifiers, and the central error type.
//!
//! It carries no engine logic. Anything that orchestrates a scan lives in
//! `lantern-engine`; anything that dispatches events lives in
//! `lantern-events`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod dom;
pub mod error;
pub mod network;
pub mod problem;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use dom::{DomElement, DomNode, DomNodeKind, DomSnapshot, DomSnapshotBuilder, NodeId};
pub use error::{LanternError, Result};
pub use network::{Headers, NetworkData, Request, Response, ResponseBody};
pub use problem::{DocLink, Fix, Problem, ProblemLocation, Severity};
pub use report::AnalyzerResult;
pub use types::{Category, HintId, MediaKind, ScanId, Timestamp};
