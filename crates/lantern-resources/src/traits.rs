//! Capability traits for pluggable resources.
//!
//! A resource is anything loaded by name: connectors, parsers, hints, and
//! formatters. Factories are registered with the
//! [`crate::registry::ResourceRegistry`]; instances are created fresh per
//! engine (connectors, parsers, hints) or shared statelessly (formatters).

use crate::context::HintContext;
use crate::error::ConnectorResult;
use crate::registry::CORE_API_VERSION;
use crate::schema::OptionsSchema;
use async_trait::async_trait;
use lantern_core::{AnalyzerResult, Category, DomElement, Headers, HintId, NetworkData};
use lantern_events::EventBus;
use std::sync::Arc;
use url::Url;

/// What the engine hands a connector at construction: the scan's bus handle.
#[derive(Debug, Clone)]
pub struct ConnectorHost {
    /// The engine's event bus; everything the connector observes is emitted
    /// here
    pub bus: EventBus,
}

/// A connector drives navigation and collection for one target.
///
/// During [`Connector::collect`] it emits `fetch::start`,
/// `fetch::start::target`, `fetch::end::<kind>`, `fetch::error`, and
/// `element::<tag>` events through the host bus. The engine only calls
/// these methods; it never reaches into connector internals.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Collect the target: fetch it, traverse its DOM, fetch referenced
    /// resources, emitting events throughout. Resolves when collection is
    /// done; a scan-stopping failure (target unreachable) is an error,
    /// per-resource failures are `fetch::error` events.
    async fn collect(&self, target: Url) -> ConnectorResult<()>;

    /// Fetch one resource on demand, outside the collection flow.
    async fn fetch_content(
        &self,
        url: &Url,
        headers: Option<&Headers>,
    ) -> ConnectorResult<NetworkData>;

    /// Evaluate a script in the page context. Built-in connectors do not
    /// support this and return [`crate::ConnectorError::EvaluationUnsupported`].
    async fn evaluate(&self, script: &str) -> ConnectorResult<serde_json::Value>;

    /// Elements of the collected target document matching a selector.
    /// Empty before `collect` has fetched the target.
    fn query_selector_all(&self, selector: &str) -> Vec<DomElement>;

    /// Release held resources. The engine calls this exactly once on every
    /// scan exit path.
    async fn close(&self) -> ConnectorResult<()>;
}

/// Builds connector instances from configuration.
pub trait ConnectorFactory: Send + Sync {
    /// The name the connector is configured by.
    fn name(&self) -> &str;

    /// Core API version this factory was built against, `major.minor.patch`.
    fn core_api_version(&self) -> &str {
        CORE_API_VERSION
    }

    /// Create an instance for one engine.
    fn create(
        &self,
        host: ConnectorHost,
        options: &serde_json::Value,
    ) -> ConnectorResult<Arc<dyn Connector>>;
}

/// What a parser receives at construction.
#[derive(Debug, Clone)]
pub struct ParserContext {
    /// The engine's event bus
    pub bus: EventBus,
}

/// A parser translates raw fetched content into structured AST events.
///
/// Parsers are purely event-driven: they subscribe to `fetch::end::*` (or
/// narrower) at construction and emit `parse::start::<kind>` /
/// `parse::end::<kind>`. The instance itself only anchors the
/// subscriptions' lifetime.
pub trait Parser: Send + Sync {
    /// The name the parser is configured by.
    fn name(&self) -> &str;
}

/// Builds parser instances.
pub trait ParserFactory: Send + Sync {
    /// The name the parser is configured by.
    fn name(&self) -> &str;

    /// Core API version this factory was built against.
    fn core_api_version(&self) -> &str {
        CORE_API_VERSION
    }

    /// Create an instance subscribed to the context's bus.
    fn create(&self, context: &ParserContext) -> Arc<dyn Parser>;
}

/// Static descriptor accompanying each hint, read at load/validation time,
/// not by the engine at runtime.
#[derive(Debug, Clone)]
pub struct HintMeta {
    /// The hint's identity
    pub id: HintId,
    /// One-line description of what the hint checks
    pub description: String,
    /// Category its problems report under
    pub category: Category,
    /// Declared option surface
    pub schema: OptionsSchema,
    /// Documentation link, if any
    pub docs_url: Option<String>,
}

/// A hint inspects events and reports problems.
///
/// All behavior lives in listeners registered at construction; the instance
/// anchors their lifetime and per-scan state (such as dedup sets).
pub trait Hint: Send + Sync {
    /// The hint's identity.
    fn id(&self) -> &HintId;
}

/// Builds hint instances.
pub trait HintFactory: Send + Sync {
    /// The static descriptor.
    fn meta(&self) -> &HintMeta;

    /// Core API version this factory was built against.
    fn core_api_version(&self) -> &str {
        CORE_API_VERSION
    }

    /// Create an instance; the hint registers its listeners here.
    fn create(&self, context: Arc<HintContext>) -> Arc<dyn Hint>;
}

/// A formatter renders finished results to a string.
///
/// Formatters are stateless and shared; callers handle writing the output.
pub trait Formatter: Send + Sync {
    /// The name the formatter is configured by.
    fn name(&self) -> &str;

    /// Core API version this formatter was built against.
    fn core_api_version(&self) -> &str {
        CORE_API_VERSION
    }

    /// Render results.
    fn format(&self, results: &[AnalyzerResult]) -> String;
}
