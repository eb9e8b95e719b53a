//! Lantern Resources - capability traits, the registry, and loading.
//!
//! This crate defines what a pluggable resource *is*: the
//! [`Connector`]/[`Parser`]/[`Hint`]/[`Formatter`] traits and their
//! factories, the [`HintContext`] capability object hints are built from,
//! declarative option schemas, and the [`ResourceRegistry`] that maps names
//! to factories and resolves a configuration into a best-effort
//! [`ResourceSet`] with `missing`/`incompatible` lists instead of errors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod context;
pub mod error;
pub mod registry;
pub mod schema;
pub mod traits;

// Re-export commonly used types
pub use context::{HintContext, ProblemSink};
pub use error::{ConnectorError, ConnectorResult};
pub use registry::{is_compatible, ResourceRegistry, ResourceSet, CORE_API_VERSION};
pub use schema::{FieldKind, FieldSpec, OptionsSchema, SchemaViolation};
pub use traits::{
    Connector, ConnectorFactory, ConnectorHost, Formatter, Hint, HintFactory, HintMeta, Parser,
    ParserContext, ParserFactory,
};
