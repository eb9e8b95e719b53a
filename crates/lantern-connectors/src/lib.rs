//! Lantern Connectors - the built-in `local` and `http` connectors.
//!
//! A connector drives collection for one target: it fetches content, emits
//! the `fetch::*` event stream, traverses HTML documents into `element::*`
//! events, and answers `query_selector_all` against the collected target
//! document. Neither built-in supports script evaluation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod http;
pub mod local;
mod select;

pub use http::{HttpConnectorFactory, HttpOptions};
pub use local::{LocalConnectorFactory, LocalOptions};

use lantern_resources::ResourceRegistry;
use std::sync::Arc;

/// Register every built-in connector.
pub fn register(registry: &mut ResourceRegistry) {
    registry.register_connector(Arc::new(LocalConnectorFactory));
    registry.register_connector(Arc::new(HttpConnectorFactory));
}
