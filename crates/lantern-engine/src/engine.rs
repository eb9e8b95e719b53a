//! The engine: one scan of one target.
//!
//! An engine owns a fresh event bus, instantiates the loaded parsers and
//! hints against it, delegates collection to the connector, and accumulates
//! everything reported. The connector's `close()` runs exactly once on
//! every exit path before `scan::end` goes out.

use crate::error::ScanError;
use crate::sink::EngineSink;
use lantern_config::ResolvedConfiguration;
use lantern_core::{Category, HintId, Problem, ScanId, Severity};
use lantern_events::{Event, EventBus, ScanOutcome, TopicPattern};
use lantern_resources::{
    ConnectorError, ConnectorHost, HintContext, ParserContext, ProblemSink, ResourceSet,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Reserved hint identity problems from `fetch::error` events record under.
pub const FETCH_ERROR_HINT_ID: &str = "fetch-error";

/// One scan cycle. Construct a fresh engine per target per scan.
pub struct Engine {
    config: Arc<ResolvedConfiguration>,
    resources: Arc<ResourceSet>,
    cancellation: CancellationToken,
}

impl Engine {
    /// Build an engine over an already-loaded resource set.
    #[must_use]
    pub fn new(
        config: Arc<ResolvedConfiguration>,
        resources: Arc<ResourceSet>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            config,
            resources,
            cancellation,
        }
    }

    /// Run the scan against one target.
    ///
    /// Resolves with every recorded problem in report order, or the first
    /// scan-stopping failure. Either way `scan::end` has been emitted and
    /// the connector closed by the time this returns.
    pub async fn analyze(self, target: Url) -> Result<Vec<Problem>, ScanError> {
        let bus = EventBus::new();
        let sink = Arc::new(EngineSink::new(Arc::clone(&self.config)));

        self.record_fetch_errors(&bus, &sink);

        // Parser and hint instances only anchor their subscriptions; they
        // must stay alive for the scan's duration
        let parser_context = ParserContext { bus: bus.clone() };
        let _parsers: Vec<_> = self
            .resources
            .parsers
            .iter()
            .map(|factory| factory.create(&parser_context))
            .collect();
        let _hints = self.instantiate_hints(&bus, &sink);

        let connector_factory = self.resources.connector.as_ref().ok_or_else(|| {
            ScanError::Connector(ConnectorError::InvalidOptions {
                message: "no connector loaded".to_string(),
            })
        })?;
        let connector = connector_factory
            .create(
                ConnectorHost { bus: bus.clone() },
                &self.config.connector.options,
            )
            .map_err(ScanError::Connector)?;

        let scan_id = ScanId::generate();
        info!(scan = %scan_id, target = %target, "scan starting");
        let scan = async {
            bus.emit_awaited(Event::ScanStart {
                scan: scan_id.clone(),
                target: target.to_string(),
            })
            .await
            .map_err(ScanError::Listener)?;
            connector
                .collect(target.clone())
                .await
                .map_err(ScanError::from_collect)
        };

        let outcome = tokio::select! {
            () = self.cancellation.cancelled() => Err(ScanError::Cancelled),
            result = tokio::time::timeout(self.config.hints_timeout, scan) => {
                result.unwrap_or(Err(ScanError::Timeout {
                    limit: self.config.hints_timeout,
                }))
            }
        };

        // Guaranteed cleanup, exactly once, before scan::end
        if let Err(e) = connector.close().await {
            warn!(error = %e, "connector close failed");
        }

        match outcome {
            Ok(()) => {
                let problems = Arc::new(sink.problems());
                info!(scan = %scan_id, target = %target, problems = problems.len(), "scan completed");
                self.emit_terminal(
                    &bus,
                    Event::ScanEnd {
                        scan: scan_id,
                        target: target.to_string(),
                        outcome: ScanOutcome::Completed {
                            problems: Arc::clone(&problems),
                        },
                    },
                )
                .await;
                self.emit_terminal(
                    &bus,
                    Event::Print {
                        target: target.to_string(),
                        problems: Arc::clone(&problems),
                    },
                )
                .await;
                Ok(Arc::try_unwrap(problems).unwrap_or_else(|shared| (*shared).clone()))
            }
            Err(error) => {
                warn!(scan = %scan_id, target = %target, error = %error, "scan failed");
                self.emit_terminal(
                    &bus,
                    Event::ScanEnd {
                        scan: scan_id,
                        target: target.to_string(),
                        outcome: ScanOutcome::Failed {
                            error: error.to_string(),
                        },
                    },
                )
                .await;
                Err(error)
            }
        }
    }

    /// Terminal events must go out even if an output-stage listener is
    /// broken; failures are logged, never propagated.
    async fn emit_terminal(&self, bus: &EventBus, event: Event) {
        if let Err(e) = bus.emit_awaited(event).await {
            warn!(error = %e, "listener failed during terminal dispatch");
        }
    }

    fn record_fetch_errors(&self, bus: &EventBus, sink: &Arc<EngineSink>) {
        let sink = Arc::clone(sink);
        bus.on(
            TopicPattern::parse("fetch::error").expect("valid fetch::error pattern"),
            move |event| {
                let sink = Arc::clone(&sink);
                Box::pin(async move {
                    if let Event::FetchError { resource, error } = event {
                        debug!(resource = %resource, "recording fetch error as problem");
                        sink.report(Problem::new(
                            HintId::new(FETCH_ERROR_HINT_ID).expect("valid reserved hint id"),
                            resource,
                            error,
                            Severity::Error,
                            Category::Other,
                        ));
                    }
                    Ok(())
                })
            },
        );
    }

    fn instantiate_hints(
        &self,
        bus: &EventBus,
        sink: &Arc<EngineSink>,
    ) -> Vec<Arc<dyn lantern_resources::Hint>> {
        let browsers = Arc::new(self.config.browsers.clone());
        self.resources
            .hints
            .iter()
            .map(|factory| {
                let meta = factory.meta();
                let (severity, options) = self.config.hints.get(&meta.id).map_or(
                    (Severity::Warning, serde_json::Value::Null),
                    |hint_config| (hint_config.severity, hint_config.options.clone()),
                );
                let context = Arc::new(HintContext::new(
                    bus.clone(),
                    Arc::clone(sink) as Arc<dyn ProblemSink>,
                    meta.id.clone(),
                    meta.category,
                    severity,
                    options,
                    self.config.language.clone(),
                    Arc::clone(&browsers),
                ));
                factory.create(context)
            })
            .collect()
    }
}
