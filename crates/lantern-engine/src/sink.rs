//! The engine's problem sink.
//!
//! Every hint report lands here, in report order. The sink applies the
//! configuration's ignored-URL patterns at record time; severity threshold
//! filtering is deliberately not applied here so the full record survives
//! for output-stage decisions.

use lantern_config::ResolvedConfiguration;
use lantern_core::Problem;
use lantern_resources::ProblemSink;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub(crate) struct EngineSink {
    config: Arc<ResolvedConfiguration>,
    problems: Mutex<Vec<Problem>>,
}

impl EngineSink {
    pub(crate) fn new(config: Arc<ResolvedConfiguration>) -> Self {
        Self {
            config,
            problems: Mutex::new(Vec::new()),
        }
    }

    /// Everything recorded so far, in report order.
    pub(crate) fn problems(&self) -> Vec<Problem> {
        self.problems
            .lock()
            .expect("acquire problems lock")
            .clone()
    }
}

impl ProblemSink for EngineSink {
    fn report(&self, problem: Problem) {
        if self.config.is_ignored(&problem.resource, &problem.hint_id) {
            debug!(
                resource = %problem.resource,
                hint = %problem.hint_id.as_str(),
                "dropping problem for ignored resource"
            );
            return;
        }
        self.problems
            .lock()
            .expect("acquire problems lock")
            .push(problem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_config::{resolve, UserConfig};
    use lantern_core::{Category, HintId, Severity};

    fn config(toml_str: &str) -> Arc<ResolvedConfiguration> {
        let raw: UserConfig = toml::from_str(toml_str).expect("parse config");
        Arc::new(resolve(&raw, None).expect("resolve config"))
    }

    fn problem(hint: &str, resource: &str, severity: Severity) -> Problem {
        Problem::new(
            HintId::new(hint).expect("valid hint id"),
            resource,
            "finding",
            severity,
            Category::Other,
        )
    }

    #[test]
    fn test_records_in_report_order() {
        let sink = EngineSink::new(config(""));
        sink.report(problem("a-hint", "https://example.com/x", Severity::Error));
        sink.report(problem("b-hint", "https://example.com/y", Severity::Hint));

        let problems = sink.problems();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].hint_id.as_str(), "a-hint");
        assert_eq!(problems[1].hint_id.as_str(), "b-hint");
    }

    #[test]
    fn test_below_threshold_severity_still_recorded() {
        // fail_threshold only matters at output time
        let sink = EngineSink::new(config("fail_threshold = \"error\"\n"));
        sink.report(problem("a-hint", "https://example.com/", Severity::Hint));
        assert_eq!(sink.problems().len(), 1);
    }

    #[test]
    fn test_ignored_resource_dropped() {
        let sink = EngineSink::new(config(
            r#"
[[ignored_urls]]
pattern = "cdn\\.example\\.com"
"#,
        ));
        sink.report(problem("a-hint", "https://cdn.example.com/x.js", Severity::Error));
        sink.report(problem("a-hint", "https://example.com/", Severity::Error));

        let problems = sink.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].resource, "https://example.com/");
    }

    #[test]
    fn test_hint_scoped_ignore_only_drops_that_hint() {
        let sink = EngineSink::new(config(
            r#"
[[ignored_urls]]
pattern = "cdn\\.example\\.com"
hints = ["noisy-hint"]
"#,
        ));
        sink.report(problem("noisy-hint", "https://cdn.example.com/x.js", Severity::Error));
        sink.report(problem("other-hint", "https://cdn.example.com/x.js", Severity::Error));

        let problems = sink.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].hint_id.as_str(), "other-hint");
    }
}
