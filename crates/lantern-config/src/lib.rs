//! Lantern Config - user configuration and resolution.
//!
//! Turns a `lantern.toml` (plus `extends` chains and built-in presets) into
//! one [`ResolvedConfiguration`] the rest of the engine runs with: normalized
//! hint severities, a concrete browser list, compiled ignore patterns, and
//! scan limits. Resolution never starts a scan; every failure here is a
//! typed [`ConfigurationError`] raised up front.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod browsers;
pub mod error;
pub mod presets;
pub mod resolver;
pub mod user_config;

// Re-export commonly used types
pub use error::{ConfigurationError, Result};
pub use resolver::{
    resolve, HintConfig, IgnorePattern, ResolvedConfiguration, ResolvedConnector,
};
pub use user_config::{ConnectorConfig, HintSetting, IgnoredUrl, UserConfig};
