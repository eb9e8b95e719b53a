//! Lantern Parsers - built-in parsers and the DOM toolkit.
//!
//! Parsers subscribe to `fetch::end::<kind>` and re-emit fetched content as
//! `parse::start` / `parse::end` events with a structured payload. This
//! crate also owns the pieces connectors share for HTML handling: snapshot
//! construction from raw markup, element traversal, and the simple selector
//! engine behind `query_selector_all`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod html;
pub mod manifest;
pub mod selector;
pub mod snapshot;
pub mod source;
pub mod traverse;

pub use html::HtmlParserFactory;
pub use manifest::ManifestParserFactory;
pub use selector::{SelectorError, SimpleSelector};
pub use snapshot::build_snapshot;
pub use source::SourceParserFactory;
pub use traverse::emit_elements;

use lantern_resources::ResourceRegistry;
use std::sync::Arc;

/// Register every built-in parser.
pub fn register(registry: &mut ResourceRegistry) {
    registry.register_parser(Arc::new(HtmlParserFactory));
    registry.register_parser(Arc::new(SourceParserFactory::css()));
    registry.register_parser(Arc::new(SourceParserFactory::javascript()));
    registry.register_parser(Arc::new(ManifestParserFactory));
}
