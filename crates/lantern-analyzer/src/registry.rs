//! The built-in resource registry.

use crate::formatters::{JsonFormatter, SummaryFormatter};
use lantern_resources::ResourceRegistry;
use std::sync::Arc;

/// Every resource that ships with lantern: both connectors, all parsers,
/// all hints, and the `summary`/`json` formatters.
#[must_use]
pub fn built_in_registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    lantern_connectors::register(&mut registry);
    lantern_parsers::register(&mut registry);
    lantern_hints::register(&mut registry);
    registry.register_formatter(Arc::new(SummaryFormatter));
    registry.register_formatter(Arc::new(JsonFormatter));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_config::{resolve, UserConfig};

    #[test]
    fn test_default_configuration_loads_completely() {
        let raw: UserConfig = toml::from_str(
            r#"
formatters = ["summary", "json"]

[hints]
"meta-charset-utf8" = "warning"
"no-disallowed-headers" = "warning"
"no-protocol-relative-urls" = "error"
"minified-js" = "hint"
"#,
        )
        .expect("parse config");
        let config = resolve(&raw, None).expect("resolve config");

        let set = built_in_registry().load(&config);
        assert!(set.is_complete(), "unresolved: {set:?}");
        assert!(set.connector.is_some());
        assert_eq!(set.parsers.len(), 4);
        assert_eq!(set.hints.len(), 4);
        assert_eq!(set.formatters.len(), 2);
    }
}
