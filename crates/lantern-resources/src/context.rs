//! The capability object handed to each hint.
//!
//! A [`HintContext`] is everything a hint may touch: event subscription,
//! problem reporting, its resolved options, and the scan's language and
//! browser targets. One context is created per hint per engine; contexts
//! never outlive their engine.

use lantern_core::{Category, HintId, Problem, ProblemLocation, Severity};
use lantern_events::{Event, EventBus, ListenerFuture, SubscriptionId, TopicPattern};
use std::sync::Arc;

/// Where reported problems go.
///
/// The engine implements this; hints only ever see the trait. Reports are
/// recorded unconditionally at the hint's resolved severity — threshold
/// filtering happens at the output stage.
pub trait ProblemSink: Send + Sync {
    /// Record one problem.
    fn report(&self, problem: Problem);
}

/// The capability object passed to each hint factory.
pub struct HintContext {
    bus: EventBus,
    sink: Arc<dyn ProblemSink>,
    hint_id: HintId,
    category: Category,
    severity: Severity,
    options: serde_json::Value,
    language: String,
    browsers: Arc<Vec<String>>,
}

impl HintContext {
    /// Build a context for one hint.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bus: EventBus,
        sink: Arc<dyn ProblemSink>,
        hint_id: HintId,
        category: Category,
        severity: Severity,
        options: serde_json::Value,
        language: String,
        browsers: Arc<Vec<String>>,
    ) -> Self {
        Self {
            bus,
            sink,
            hint_id,
            category,
            severity,
            options,
            language,
            browsers,
        }
    }

    /// Subscribe a listener to a topic pattern on the engine's bus.
    pub fn on<F>(&self, pattern: TopicPattern, listener: F) -> SubscriptionId
    where
        F: Fn(Event) -> ListenerFuture + Send + Sync + 'static,
    {
        self.bus.on(pattern, listener)
    }

    /// Report a finding against a resource at the hint's resolved severity.
    pub fn report(&self, resource: impl Into<String>, message: impl Into<String>) {
        self.sink.report(self.problem(resource, message));
    }

    /// Report a finding with a source location.
    pub fn report_at(
        &self,
        resource: impl Into<String>,
        message: impl Into<String>,
        location: ProblemLocation,
    ) {
        self.sink
            .report(self.problem(resource, message).with_location(location));
    }

    /// Report a fully built problem, for findings with snippets or fixes.
    ///
    /// The problem's hint identity must be this context's; use
    /// [`HintContext::problem`] to start from the right one.
    pub fn report_problem(&self, problem: Problem) {
        self.sink.report(problem);
    }

    /// Start a problem attributed to this hint, for builder-style reports.
    #[must_use]
    pub fn problem(&self, resource: impl Into<String>, message: impl Into<String>) -> Problem {
        Problem::new(
            self.hint_id.clone(),
            resource,
            message,
            self.severity,
            self.category,
        )
    }

    /// The hint's identity.
    #[must_use]
    pub fn hint_id(&self) -> &HintId {
        &self.hint_id
    }

    /// The severity this hint's problems record at.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The resolved options, already validated against the hint's schema.
    #[must_use]
    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }

    /// The scan's language tag.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Concrete browser identifiers the scan targets.
    #[must_use]
    pub fn targeted_browsers(&self) -> &[String] {
        &self.browsers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        problems: Mutex<Vec<Problem>>,
    }

    impl ProblemSink for RecordingSink {
        fn report(&self, problem: Problem) {
            self.problems.lock().expect("acquire problems lock").push(problem);
        }
    }

    fn context(sink: Arc<RecordingSink>) -> HintContext {
        HintContext::new(
            EventBus::new(),
            sink,
            HintId::new("meta-charset-utf8").expect("valid hint id"),
            Category::Compatibility,
            Severity::Warning,
            serde_json::json!({ "threshold": 10 }),
            "en".to_string(),
            Arc::new(vec!["chrome 127".to_string()]),
        )
    }

    #[test]
    fn test_report_uses_hint_identity_and_severity() {
        let sink = Arc::new(RecordingSink {
            problems: Mutex::new(Vec::new()),
        });
        let ctx = context(Arc::clone(&sink));

        ctx.report("https://example.com/", "charset missing");

        let problems = sink.problems.lock().expect("acquire problems lock");
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].hint_id.as_str(), "meta-charset-utf8");
        assert_eq!(problems[0].severity, Severity::Warning);
        assert_eq!(problems[0].category, Category::Compatibility);
        assert!(problems[0].location.is_none());
    }

    #[test]
    fn test_report_at_attaches_location() {
        let sink = Arc::new(RecordingSink {
            problems: Mutex::new(Vec::new()),
        });
        let ctx = context(Arc::clone(&sink));

        ctx.report_at(
            "https://example.com/",
            "charset missing",
            ProblemLocation::new(2, 1),
        );

        let problems = sink.problems.lock().expect("acquire problems lock");
        assert_eq!(problems[0].location, Some(ProblemLocation::new(2, 1)));
    }

    #[test]
    fn test_context_accessors() {
        let sink = Arc::new(RecordingSink {
            problems: Mutex::new(Vec::new()),
        });
        let ctx = context(sink);

        assert_eq!(ctx.language(), "en");
        assert_eq!(ctx.targeted_browsers(), &["chrome 127".to_string()]);
        assert_eq!(ctx.options()["threshold"], 10);
        assert_eq!(ctx.severity(), Severity::Warning);
    }
}
