//! Lantern Analyzer - the public façade.
//!
//! Resolve a user configuration, load the built-in resources, and run
//! scans:
//!
//! ```no_run
//! use lantern_analyzer::{create_analyzer, AnalyzerOptions, ScanHooks};
//! use lantern_config::UserConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! lantern_analyzer::logging::init();
//!
//! let config = UserConfig::discover(None)?;
//! let analyzer = create_analyzer(&config, AnalyzerOptions::default())?;
//! let results = analyzer
//!     .analyze(&["https://example.com/"], &ScanHooks::new())
//!     .await?;
//!
//! for report in analyzer.format(&results) {
//!     println!("{}", report.output);
//! }
//! std::process::exit(i32::from(!analyzer.passed(&results)));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod analyzer;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod registry;
pub mod watch;

pub use analyzer::{
    create_analyzer, Analyzer, AnalyzerOptions, FormattedReport, ScanHooks,
};
pub use error::{AnalyzerError, WatchError};
pub use registry::built_in_registry;
