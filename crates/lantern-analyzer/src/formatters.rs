//! Built-in formatters.
//!
//! `summary` renders per-hint counts for humans; `json` is a lossless serde
//! serialization of the results. Formatters produce strings; where the
//! output goes is the caller's business.

use lantern_core::AnalyzerResult;
use lantern_resources::Formatter;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Human-readable per-hint summary.
#[derive(Debug, Default)]
pub struct SummaryFormatter;

impl Formatter for SummaryFormatter {
    fn name(&self) -> &str {
        "summary"
    }

    fn format(&self, results: &[AnalyzerResult]) -> String {
        let mut out = String::new();
        for result in results {
            let (hints, warnings, errors) = result.severity_counts();
            let _ = writeln!(
                out,
                "{}: {} error(s), {} warning(s), {} hint(s)",
                result.target, errors, warnings, hints
            );

            let mut per_hint: BTreeMap<&str, usize> = BTreeMap::new();
            for problem in &result.problems {
                *per_hint.entry(problem.hint_id.as_str()).or_default() += 1;
            }
            for (hint, count) in per_hint {
                let _ = writeln!(out, "  {hint}: {count}");
            }
        }
        out
    }
}

/// Lossless JSON rendering of the full result list.
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn format(&self, results: &[AnalyzerResult]) -> String {
        serde_json::to_string_pretty(results)
            .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}
