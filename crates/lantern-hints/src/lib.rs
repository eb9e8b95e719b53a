//! Lantern Hints - the built-in checks.
//!
//! Each hint subscribes to scan events through its
//! [`lantern_resources::HintContext`] and
//! reports findings as problems. Hints own their own deduplication: the
//! engine records every report, so a hint tracks what it has already said
//! about a resource within one scan.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod meta_charset_utf8;
pub mod minified_js;
pub mod no_disallowed_headers;
pub mod no_protocol_relative_urls;

pub use meta_charset_utf8::MetaCharsetUtf8Factory;
pub use minified_js::MinifiedJsFactory;
pub use no_disallowed_headers::NoDisallowedHeadersFactory;
pub use no_protocol_relative_urls::NoProtocolRelativeUrlsFactory;

use lantern_resources::ResourceRegistry;
use std::sync::Arc;

/// Register every built-in hint.
pub fn register(registry: &mut ResourceRegistry) {
    registry.register_hint(Arc::new(MetaCharsetUtf8Factory::default()));
    registry.register_hint(Arc::new(NoDisallowedHeadersFactory::default()));
    registry.register_hint(Arc::new(NoProtocolRelativeUrlsFactory::default()));
    registry.register_hint(Arc::new(MinifiedJsFactory::default()));
}
