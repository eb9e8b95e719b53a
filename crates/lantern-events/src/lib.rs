//! Lantern Events - the typed publish/subscribe bus.
//!
//! Every component of a scan communicates over this bus: connectors emit
//! fetch and element events, parsers emit AST events, the engine emits
//! lifecycle events, and hints subscribe to any of them. Topics are
//! hierarchical (`fetch::end::html`), subscriptions may use wildcards, and
//! dispatch comes in two flavors:
//!
//! - [`EventBus::emit`]: fire-and-forget, failures logged
//! - [`EventBus::emit_awaited`]: every matching listener runs to completion
//!   in a documented order before the call resolves
//!
//! # Matching rules
//!
//! A pattern without wildcards matches only the identical topic. A `*`
//! segment matches exactly one topic segment at that position, so
//! `fetch::end::*` matches `fetch::end::html` but not `fetch::end` or
//! `fetch::end::html::extra`. A trailing `**` matches one or more remaining
//! segments, so `fetch::**` matches every fetch topic. A shorter pattern
//! never matches a longer topic implicitly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod bus;
pub mod event;
pub mod topic;

// Re-export commonly used types
pub use bus::{DispatchError, EventBus, ListenerError, ListenerFuture, SubscriptionId};
pub use event::{topics, AstPayload, Event, ScanOutcome};
pub use topic::{Topic, TopicError, TopicPattern};
