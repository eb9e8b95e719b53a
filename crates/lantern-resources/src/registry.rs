//! The resource registry and best-effort loading.
//!
//! The registry is the seam between the engine and the host's package
//! resolution: built-in crates register their factories, embedders register
//! third-party ones, and [`ResourceRegistry::load`] resolves a configuration
//! against whatever is registered. Loading never fails — absent names land
//! in `missing`, version mismatches in `incompatible`, and the caller
//! decides what to do with the lists.

use crate::traits::{ConnectorFactory, Formatter, HintFactory, ParserFactory};
use lantern_config::ResolvedConfiguration;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The core API version this build exposes to resources.
///
/// A factory is compatible when its declared version matches on
/// major.minor; patch differences are fine.
pub const CORE_API_VERSION: &str = "1.0.0";

/// Whether a factory's declared version is compatible with the running core.
#[must_use]
pub fn is_compatible(declared: &str) -> bool {
    let major_minor = |v: &str| -> Option<(String, String)> {
        let mut parts = v.split('.');
        Some((parts.next()?.to_string(), parts.next()?.to_string()))
    };
    match (major_minor(declared), major_minor(CORE_API_VERSION)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Everything loaded for one analyzer, plus what could not be loaded.
///
/// Immutable after loading; safely shared read-only across engines.
#[derive(Clone)]
pub struct ResourceSet {
    /// The configured connector's factory, if it loaded
    pub connector: Option<Arc<dyn ConnectorFactory>>,
    /// Parser factories, in registration order
    pub parsers: Vec<Arc<dyn ParserFactory>>,
    /// Hint factories for the enabled hints that loaded
    pub hints: Vec<Arc<dyn HintFactory>>,
    /// Formatters in configured order
    pub formatters: Vec<Arc<dyn Formatter>>,
    /// Names that are not registered at all
    pub missing: Vec<String>,
    /// Names whose factories declare an incompatible core API version
    pub incompatible: Vec<String>,
}

impl ResourceSet {
    /// Whether every configured resource loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.incompatible.is_empty()
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSet")
            .field("connector", &self.connector.as_ref().map(|c| c.name().to_string()))
            .field("parsers", &self.parsers.len())
            .field("hints", &self.hints.len())
            .field("formatters", &self.formatters.len())
            .field("missing", &self.missing)
            .field("incompatible", &self.incompatible)
            .finish()
    }
}

/// Name-to-factory maps for every resource kind.
///
/// `BTreeMap` keeps iteration deterministic, which keeps "load all
/// registered parsers" deterministic too.
#[derive(Default)]
pub struct ResourceRegistry {
    connectors: BTreeMap<String, Arc<dyn ConnectorFactory>>,
    parsers: BTreeMap<String, Arc<dyn ParserFactory>>,
    hints: BTreeMap<String, Arc<dyn HintFactory>>,
    formatters: BTreeMap<String, Arc<dyn Formatter>>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector factory under its own name.
    pub fn register_connector(&mut self, factory: Arc<dyn ConnectorFactory>) {
        debug!(name = factory.name(), "registering connector");
        self.connectors.insert(factory.name().to_string(), factory);
    }

    /// Register a parser factory under its own name.
    pub fn register_parser(&mut self, factory: Arc<dyn ParserFactory>) {
        debug!(name = factory.name(), "registering parser");
        self.parsers.insert(factory.name().to_string(), factory);
    }

    /// Register a hint factory under its meta identifier.
    pub fn register_hint(&mut self, factory: Arc<dyn HintFactory>) {
        let id = factory.meta().id.as_str().to_string();
        debug!(name = %id, "registering hint");
        self.hints.insert(id, factory);
    }

    /// Register a formatter under its own name.
    pub fn register_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        debug!(name = formatter.name(), "registering formatter");
        self.formatters.insert(formatter.name().to_string(), formatter);
    }

    /// Hint factory by identifier, for meta/schema lookups.
    #[must_use]
    pub fn hint(&self, id: &str) -> Option<&Arc<dyn HintFactory>> {
        self.hints.get(id)
    }

    /// Resolve a configuration against the registered factories.
    ///
    /// Best-effort by contract: never fails, classifies every unloadable
    /// name as `missing` (not registered) or `incompatible` (registered but
    /// version-mismatched).
    #[must_use]
    pub fn load(&self, config: &ResolvedConfiguration) -> ResourceSet {
        let mut missing = Vec::new();
        let mut incompatible = Vec::new();

        let connector = match self.connectors.get(&config.connector.name) {
            Some(factory) if is_compatible(factory.core_api_version()) => {
                Some(Arc::clone(factory))
            }
            Some(factory) => {
                warn!(
                    name = factory.name(),
                    declared = factory.core_api_version(),
                    running = CORE_API_VERSION,
                    "connector is incompatible"
                );
                incompatible.push(config.connector.name.clone());
                None
            }
            None => {
                missing.push(config.connector.name.clone());
                None
            }
        };

        // An empty parser list means every registered parser.
        let mut parsers = Vec::new();
        if config.parsers.is_empty() {
            for factory in self.parsers.values() {
                if is_compatible(factory.core_api_version()) {
                    parsers.push(Arc::clone(factory));
                } else {
                    incompatible.push(factory.name().to_string());
                }
            }
        } else {
            for name in &config.parsers {
                match self.parsers.get(name) {
                    Some(factory) if is_compatible(factory.core_api_version()) => {
                        parsers.push(Arc::clone(factory));
                    }
                    Some(_) => incompatible.push(name.clone()),
                    None => missing.push(name.clone()),
                }
            }
        }

        let mut hints = Vec::new();
        for id in config.enabled_hints() {
            match self.hints.get(id.as_str()) {
                Some(factory) if is_compatible(factory.core_api_version()) => {
                    hints.push(Arc::clone(factory));
                }
                Some(_) => incompatible.push(id.as_str().to_string()),
                None => missing.push(id.as_str().to_string()),
            }
        }

        let mut formatters = Vec::new();
        for name in &config.formatters {
            match self.formatters.get(name) {
                Some(formatter) if is_compatible(formatter.core_api_version()) => {
                    formatters.push(Arc::clone(formatter));
                }
                Some(_) => incompatible.push(name.clone()),
                None => missing.push(name.clone()),
            }
        }

        debug!(
            parsers = parsers.len(),
            hints = hints.len(),
            missing = missing.len(),
            incompatible = incompatible.len(),
            "resolved resource set"
        );

        ResourceSet {
            connector,
            parsers,
            hints,
            formatters,
            missing,
            incompatible,
        }
    }
}
