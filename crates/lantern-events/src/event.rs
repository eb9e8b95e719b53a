//! The typed events flowing through a scan.
//!
//! [`Event`] couples the payload with its topic identity: emitters construct
//! a variant and the bus routes it by [`Event::topic`]. Payloads are
//! `Arc`-shared so an event can be delivered to many listeners cheaply.

use lantern_core::{DomElement, DomSnapshot, MediaKind, NetworkData, Problem, ScanId};
use std::sync::Arc;

use crate::topic::Topic;

/// The fixed topic taxonomy.
///
/// Subscribers match against these; emitting new topic kinds is additive and
/// must not collide with existing wildcard subscriptions.
pub mod topics {
    /// Emitted once when a scan begins.
    pub const SCAN_START: &str = "scan::start";
    /// Emitted once when a scan ends, successfully or not.
    pub const SCAN_END: &str = "scan::end";
    /// Emitted after a successful scan with the final problem list.
    pub const PRINT: &str = "print";
    /// Emitted before any resource fetch.
    pub const FETCH_START: &str = "fetch::start";
    /// Emitted before the target itself is fetched.
    pub const FETCH_START_TARGET: &str = "fetch::start::target";
    /// Emitted when a fetch fails without stopping the scan.
    pub const FETCH_ERROR: &str = "fetch::error";
    /// Emitted when a connector is ready to evaluate scripts.
    pub const CAN_EVALUATE_SCRIPT: &str = "can-evaluate::script";
    /// Wildcard pattern for every completed fetch, any media kind.
    pub const FETCH_END_ALL: &str = "fetch::end::*";
    /// Wildcard pattern for every DOM traversal event, any tag.
    pub const ELEMENT_ALL: &str = "element::*";
    /// Wildcard pattern for every parse start, any kind.
    pub const PARSE_START_ALL: &str = "parse::start::*";
    /// Wildcard pattern for every parse end, any kind.
    pub const PARSE_END_ALL: &str = "parse::end::*";

    /// Concrete topic for a completed fetch of the given kind.
    #[must_use]
    pub fn fetch_end(kind: lantern_core::MediaKind) -> String {
        format!("fetch::end::{}", kind.as_str())
    }

    /// Concrete topic for a parse start of the given kind.
    #[must_use]
    pub fn parse_start(kind: lantern_core::MediaKind) -> String {
        format!("parse::start::{}", kind.as_str())
    }

    /// Concrete topic for a parse end of the given kind.
    #[must_use]
    pub fn parse_end(kind: lantern_core::MediaKind) -> String {
        format!("parse::end::{}", kind.as_str())
    }

    /// Concrete topic for a traversal event on the given tag.
    #[must_use]
    pub fn element(tag: &str) -> String {
        format!("element::{tag}")
    }
}

/// How a scan ended.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// The connector finished collecting; problems are the final list
    Completed {
        /// Everything reported during the scan, in report order
        problems: Arc<Vec<Problem>>,
    },
    /// The scan failed (connector error, listener error, timeout)
    Failed {
        /// Human-readable failure description
        error: String,
    },
}

impl ScanOutcome {
    /// Whether the scan completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// AST payload attached to `parse::end::<kind>` events.
#[derive(Debug, Clone)]
pub enum AstPayload {
    /// Parsed HTML document
    Html {
        /// The arena snapshot
        document: Arc<DomSnapshot>,
    },
    /// Parsed JSON document (manifests and friends)
    Json {
        /// The parsed value
        value: Arc<serde_json::Value>,
    },
    /// Raw source for kinds parsed downstream by hints (CSS, JavaScript)
    Source {
        /// The source text
        text: Arc<String>,
    },
}

impl AstPayload {
    /// The HTML snapshot, if this payload carries one.
    #[must_use]
    pub fn as_html(&self) -> Option<&Arc<DomSnapshot>> {
        match self {
            Self::Html { document } => Some(document),
            _ => None,
        }
    }

    /// The JSON value, if this payload carries one.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json { value } => Some(value),
            _ => None,
        }
    }

    /// The raw source text, if this payload carries one.
    #[must_use]
    pub fn as_source(&self) -> Option<&str> {
        match self {
            Self::Source { text } => Some(text),
            _ => None,
        }
    }
}

/// One event on the bus.
#[derive(Debug, Clone)]
pub enum Event {
    /// A scan began for the given target URL
    ScanStart {
        /// Identity of this engine cycle
        scan: ScanId,
        /// Target URL
        target: String,
    },
    /// A scan ended
    ScanEnd {
        /// Identity of this engine cycle, matching its `ScanStart`
        scan: ScanId,
        /// Target URL
        target: String,
        /// How it ended
        outcome: ScanOutcome,
    },
    /// Final problem list of a completed scan, for output-stage subscribers
    Print {
        /// Target URL
        target: String,
        /// Everything reported, in report order
        problems: Arc<Vec<Problem>>,
    },
    /// A resource fetch is starting
    FetchStart {
        /// Resource URL
        resource: String,
    },
    /// The target itself is about to be fetched
    FetchStartTarget {
        /// Target URL
        resource: String,
    },
    /// A resource fetch completed; topic kind comes from the network data
    FetchEnd {
        /// Captured request/response pair
        network: Arc<NetworkData>,
    },
    /// A resource fetch failed without stopping the scan
    FetchError {
        /// Resource URL
        resource: String,
        /// Failure description
        error: String,
    },
    /// DOM traversal visited an element
    Element {
        /// URL of the document being traversed
        resource: String,
        /// The visited element
        element: DomElement,
    },
    /// A parser began processing a fetched resource
    ParseStart {
        /// Content kind being parsed
        kind: MediaKind,
        /// Resource URL
        resource: String,
    },
    /// A parser finished, payload attached
    ParseEnd {
        /// Content kind parsed
        kind: MediaKind,
        /// Resource URL
        resource: String,
        /// The AST
        payload: AstPayload,
    },
    /// The connector can evaluate scripts in the page context
    CanEvaluateScript {
        /// Target URL
        resource: String,
    },
}

impl Event {
    /// The concrete topic this event dispatches under.
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::ScanStart { .. } => Topic::from_validated(topics::SCAN_START.to_string()),
            Self::ScanEnd { .. } => Topic::from_validated(topics::SCAN_END.to_string()),
            Self::Print { .. } => Topic::from_validated(topics::PRINT.to_string()),
            Self::FetchStart { .. } => Topic::from_validated(topics::FETCH_START.to_string()),
            Self::FetchStartTarget { .. } => {
                Topic::from_validated(topics::FETCH_START_TARGET.to_string())
            }
            Self::FetchEnd { network } => {
                Topic::from_validated(topics::fetch_end(network.media_kind()))
            }
            Self::FetchError { .. } => Topic::from_validated(topics::FETCH_ERROR.to_string()),
            Self::Element { element, .. } => {
                // Exotic parsed tag names could break the grammar; fold them
                // into the unknown bucket instead of failing dispatch.
                let tag = element.tag_name().unwrap_or("unknown");
                Topic::new(topics::element(tag))
                    .unwrap_or_else(|_| Topic::from_validated(topics::element("unknown")))
            }
            Self::ParseStart { kind, .. } => Topic::from_validated(topics::parse_start(*kind)),
            Self::ParseEnd { kind, .. } => Topic::from_validated(topics::parse_end(*kind)),
            Self::CanEvaluateScript { .. } => {
                Topic::from_validated(topics::CAN_EVALUATE_SCRIPT.to_string())
            }
        }
    }

    /// The resource URL this event concerns.
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::ScanStart { target, .. }
            | Self::ScanEnd { target, .. }
            | Self::Print { target, .. } => target,
            Self::FetchStart { resource }
            | Self::FetchStartTarget { resource }
            | Self::FetchError { resource, .. }
            | Self::Element { resource, .. }
            | Self::ParseStart { resource, .. }
            | Self::ParseEnd { resource, .. }
            | Self::CanEvaluateScript { resource } => resource,
            Self::FetchEnd { network } => &network.resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::{
        DomSnapshotBuilder, Headers, Request, Response, ResponseBody,
    };

    fn network_data(kind: MediaKind) -> Arc<NetworkData> {
        Arc::new(NetworkData {
            resource: "https://example.com/a".to_string(),
            request: Request::new("https://example.com/a"),
            response: Response {
                url: "https://example.com/a".to_string(),
                status: 200,
                headers: Headers::new(),
                body: ResponseBody::from_text(""),
                media_kind: kind,
            },
        })
    }

    #[test]
    fn test_lifecycle_topics() {
        let scan = ScanId::generate();
        let start = Event::ScanStart {
            scan: scan.clone(),
            target: "https://example.com/".to_string(),
        };
        assert_eq!(start.topic().as_str(), "scan::start");

        let end = Event::ScanEnd {
            scan,
            target: "https://example.com/".to_string(),
            outcome: ScanOutcome::Failed {
                error: "timed out".to_string(),
            },
        };
        assert_eq!(end.topic().as_str(), "scan::end");

        let print = Event::Print {
            target: "https://example.com/".to_string(),
            problems: Arc::new(Vec::new()),
        };
        assert_eq!(print.topic().as_str(), "print");
    }

    #[test]
    fn test_fetch_end_topic_uses_media_kind() {
        let event = Event::FetchEnd {
            network: network_data(MediaKind::Css),
        };
        assert_eq!(event.topic().as_str(), "fetch::end::css");

        let event = Event::FetchEnd {
            network: network_data(MediaKind::Javascript),
        };
        assert_eq!(event.topic().as_str(), "fetch::end::javascript");
    }

    #[test]
    fn test_element_topic_uses_tag_name() {
        let mut builder = DomSnapshotBuilder::new();
        let root = builder.root();
        let meta = builder.push_element(root, "meta", vec![]);
        let snapshot = Arc::new(builder.finish("https://example.com/"));

        let event = Event::Element {
            resource: "https://example.com/".to_string(),
            element: DomElement {
                document: snapshot,
                node: meta,
            },
        };
        assert_eq!(event.topic().as_str(), "element::meta");
    }

    #[test]
    fn test_parse_topics() {
        let start = Event::ParseStart {
            kind: MediaKind::Html,
            resource: "https://example.com/".to_string(),
        };
        assert_eq!(start.topic().as_str(), "parse::start::html");

        let end = Event::ParseEnd {
            kind: MediaKind::Manifest,
            resource: "https://example.com/site.webmanifest".to_string(),
            payload: AstPayload::Json {
                value: Arc::new(serde_json::json!({})),
            },
        };
        assert_eq!(end.topic().as_str(), "parse::end::manifest");
    }

    #[test]
    fn test_event_resource() {
        let event = Event::FetchEnd {
            network: network_data(MediaKind::Html),
        };
        assert_eq!(event.resource(), "https://example.com/a");

        let event = Event::FetchError {
            resource: "https://example.com/missing.css".to_string(),
            error: "404".to_string(),
        };
        assert_eq!(event.resource(), "https://example.com/missing.css");
    }

    #[test]
    fn test_ast_payload_accessors() {
        let html = AstPayload::Html {
            document: Arc::new(DomSnapshotBuilder::new().finish("https://example.com/")),
        };
        assert!(html.as_html().is_some());
        assert!(html.as_json().is_none());
        assert!(html.as_source().is_none());

        let source = AstPayload::Source {
            text: Arc::new("var x = 1;".to_string()),
        };
        assert_eq!(source.as_source(), Some("var x = 1;"));
    }
}
