//! The analyzer façade.
//!
//! [`create_analyzer`] resolves configuration, loads resources, and
//! validates the combination up front so every later failure is a scan
//! failure, not a configuration surprise. [`Analyzer::analyze`] then runs
//! one engine cycle per target with bounded concurrency.

use crate::error::AnalyzerError;
use crate::registry::built_in_registry;
use futures::stream::{FuturesUnordered, StreamExt};
use lantern_config::{resolve, ResolvedConfiguration, UserConfig};
use lantern_core::AnalyzerResult;
use lantern_engine::Engine;
use lantern_events::EventBus;
use lantern_resources::{ConnectorHost, ResourceRegistry, ResourceSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

/// Infallible progress callbacks.
///
/// Hooks observe progress; they cannot abort a scan. All are optional.
#[derive(Default)]
pub struct ScanHooks {
    target_start: Option<Box<dyn Fn(&str) + Send + Sync>>,
    update: Option<Box<dyn Fn(&str, &str) + Send + Sync>>,
    target_end: Option<Box<dyn Fn(&AnalyzerResult) + Send + Sync>>,
}

impl ScanHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the target URL as its scan begins.
    #[must_use]
    pub fn on_target_start(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.target_start = Some(Box::new(hook));
        self
    }

    /// Called with (target, message) on intermediate progress, such as a
    /// watch-mode change trigger.
    #[must_use]
    pub fn on_update(mut self, hook: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.update = Some(Box::new(hook));
        self
    }

    /// Called with the finished result as each target's scan completes.
    #[must_use]
    pub fn on_target_end(mut self, hook: impl Fn(&AnalyzerResult) + Send + Sync + 'static) -> Self {
        self.target_end = Some(Box::new(hook));
        self
    }

    pub(crate) fn target_start(&self, target: &str) {
        if let Some(hook) = &self.target_start {
            hook(target);
        }
    }

    pub(crate) fn update(&self, target: &str, message: &str) {
        if let Some(hook) = &self.update {
            hook(target, message);
        }
    }

    pub(crate) fn target_end(&self, result: &AnalyzerResult) {
        if let Some(hook) = &self.target_end {
            hook(result);
        }
    }
}

/// Options for [`create_analyzer`].
#[derive(Default)]
pub struct AnalyzerOptions {
    /// Directory `extends` file references resolve against
    pub base_dir: Option<PathBuf>,
    /// External cancellation; a default token means "never cancelled"
    pub cancellation: Option<CancellationToken>,
    /// Registry to load from; defaults to the built-in resources
    pub registry: Option<ResourceRegistry>,
}

/// A named formatter's rendered output.
#[derive(Debug, Clone)]
pub struct FormattedReport {
    /// The formatter's name
    pub formatter: String,
    /// What it rendered
    pub output: String,
}

/// A validated, ready-to-scan analyzer.
pub struct Analyzer {
    pub(crate) config: Arc<ResolvedConfiguration>,
    pub(crate) resources: Arc<ResourceSet>,
    pub(crate) cancellation: CancellationToken,
}

/// Resolve, load, and validate everything a scan will need.
///
/// Fails fast on unresolved configuration, missing or incompatible
/// resources, hint options that violate their schemas, and connector
/// options the connector rejects. A successfully created analyzer will not
/// fail for configuration reasons later.
pub fn create_analyzer(
    user_config: &UserConfig,
    options: AnalyzerOptions,
) -> Result<Analyzer, AnalyzerError> {
    let config = resolve(user_config, options.base_dir.as_deref())?;
    let registry = options.registry.unwrap_or_else(built_in_registry);

    let resources = registry.load(&config);
    if !resources.is_complete() {
        return Err(AnalyzerError::Resources {
            missing: resources.missing.clone(),
            incompatible: resources.incompatible.clone(),
        });
    }

    let mut violations = Vec::new();
    for id in config.enabled_hints() {
        let Some(factory) = registry.hint(id.as_str()) else {
            // load() already classified unknown names
            continue;
        };
        let Some(hint_config) = config.hints.get(&id) else {
            continue;
        };
        if let Err(found) = factory.meta().schema.validate(&hint_config.options) {
            for violation in found {
                violations.push(format!(
                    "{}: {}: {}",
                    id.as_str(),
                    violation.field,
                    violation.message
                ));
            }
        }
    }
    if !violations.is_empty() {
        return Err(AnalyzerError::Hints { violations });
    }

    // Let the connector reject its options before any scan starts; the
    // probe instance is discarded
    if let Some(factory) = &resources.connector {
        factory
            .create(
                ConnectorHost {
                    bus: EventBus::new(),
                },
                &config.connector.options,
            )
            .map_err(|e| AnalyzerError::Connector {
                message: e.to_string(),
            })?;
    }

    debug!(
        connector = %config.connector.name,
        hints = resources.hints.len(),
        "analyzer created"
    );

    Ok(Analyzer {
        config: Arc::new(config),
        resources: Arc::new(resources),
        cancellation: options.cancellation.unwrap_or_default(),
    })
}

impl Analyzer {
    /// The resolved configuration scans will run under.
    #[must_use]
    pub fn config(&self) -> &ResolvedConfiguration {
        &self.config
    }

    /// Analyze each target, in input order, with at most
    /// `max_concurrent_targets` engines in flight.
    ///
    /// The first scan failure fails the whole call; completed results from
    /// other targets are discarded with it.
    pub async fn analyze<S: AsRef<str>>(
        &self,
        targets: &[S],
        hooks: &ScanHooks,
    ) -> Result<Vec<AnalyzerResult>, AnalyzerError> {
        let mut parsed = Vec::with_capacity(targets.len());
        for raw in targets {
            let raw = raw.as_ref();
            let url = Url::parse(raw).map_err(|e| AnalyzerError::InvalidTarget {
                target: raw.to_string(),
                message: e.to_string(),
            })?;
            parsed.push(url);
        }

        info!(targets = parsed.len(), "analysis starting");

        let mut queue = parsed.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut indexed: Vec<(usize, AnalyzerResult)> = Vec::with_capacity(targets.len());

        loop {
            while in_flight.len() < self.config.max_concurrent_targets {
                let Some((index, target)) = queue.next() else {
                    break;
                };
                hooks.target_start(target.as_str());
                let engine = Engine::new(
                    Arc::clone(&self.config),
                    Arc::clone(&self.resources),
                    self.cancellation.child_token(),
                );
                in_flight.push(async move {
                    let outcome = engine.analyze(target.clone()).await;
                    (index, target, outcome)
                });
            }

            let Some((index, target, outcome)) = in_flight.next().await else {
                break;
            };
            match outcome {
                Ok(problems) => {
                    let result = AnalyzerResult::new(target.as_str(), problems);
                    hooks.target_end(&result);
                    indexed.push((index, result));
                }
                Err(source) => {
                    return Err(AnalyzerError::Scan {
                        target: target.to_string(),
                        source,
                    });
                }
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    /// Render results through every configured formatter, in order.
    #[must_use]
    pub fn format(&self, results: &[AnalyzerResult]) -> Vec<FormattedReport> {
        self.resources
            .formatters
            .iter()
            .map(|formatter| FormattedReport {
                formatter: formatter.name().to_string(),
                output: formatter.format(results),
            })
            .collect()
    }

    /// Whether every result passes at the configured fail threshold.
    #[must_use]
    pub fn passed(&self, results: &[AnalyzerResult]) -> bool {
        results
            .iter()
            .all(|result| result.passed(self.config.fail_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_config(toml_str: &str) -> UserConfig {
        toml::from_str(toml_str).expect("parse config")
    }

    #[test]
    fn test_create_with_defaults() {
        let analyzer = create_analyzer(&user_config(""), AnalyzerOptions::default())
            .expect("create analyzer");
        assert_eq!(analyzer.config().connector.name, "http");
    }

    #[test]
    fn test_unknown_hint_is_resources_error() {
        let err = create_analyzer(
            &user_config("[hints]\n\"totally-fake-hint\" = \"error\"\n"),
            AnalyzerOptions::default(),
        )
        .err()
        .expect("must fail");

        match err {
            AnalyzerError::Resources { missing, .. } => {
                assert_eq!(missing, vec!["totally-fake-hint"]);
            }
            other => panic!("expected Resources error, got {other}"),
        }
    }

    #[test]
    fn test_schema_violation_is_hints_error() {
        let err = create_analyzer(
            &user_config(
                r#"
[hints.minified-js]
severity = "warning"
[hints.minified-js.options]
threshold = "very strict"
"#,
            ),
            AnalyzerOptions::default(),
        )
        .err()
        .expect("must fail");

        match err {
            AnalyzerError::Hints { violations } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].starts_with("minified-js: threshold:"));
            }
            other => panic!("expected Hints error, got {other}"),
        }
    }

    #[test]
    fn test_bad_connector_options_rejected() {
        let err = create_analyzer(
            &user_config(
                r#"
[connector]
name = "local"
[connector.options]
max_depth = "bottomless"
"#,
            ),
            AnalyzerOptions::default(),
        )
        .err()
        .expect("must fail");

        assert!(matches!(err, AnalyzerError::Connector { .. }));
    }

    #[tokio::test]
    async fn test_invalid_target_rejected() {
        let analyzer = create_analyzer(&user_config(""), AnalyzerOptions::default())
            .expect("create analyzer");

        let err = analyzer
            .analyze(&["not a url"], &ScanHooks::new())
            .await
            .err()
            .expect("must fail");
        assert!(matches!(err, AnalyzerError::InvalidTarget { .. }));
    }
}
