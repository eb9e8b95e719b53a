//! Per-target scan results.
//!
//! An [`AnalyzerResult`] is the output of one engine cycle: the target plus
//! everything reported against it. Threshold filtering lives here so the
//! recorded problem list stays complete for auditing while output stages
//! work with the at-or-above subset.

use crate::problem::{Problem, Severity};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// The result of analyzing one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    /// The target URL that was analyzed
    pub target: String,
    /// Every problem recorded during the scan, in report order
    pub problems: Vec<Problem>,
    /// When the scan finished
    pub finished_at: Timestamp,
}

impl AnalyzerResult {
    /// Create a result from a finished scan, stamped with the current time.
    #[must_use]
    pub fn new(target: impl Into<String>, problems: Vec<Problem>) -> Self {
        Self {
            target: target.into(),
            problems,
            finished_at: Timestamp::now(),
        }
    }

    /// Problems at or above the given severity threshold.
    #[must_use]
    pub fn filter_at(&self, threshold: Severity) -> Vec<&Problem> {
        self.problems
            .iter()
            .filter(|p| p.severity.meets(threshold))
            .collect()
    }

    /// Whether the scan passes at the given threshold: no problem at or
    /// above it.
    #[must_use]
    pub fn passed(&self, threshold: Severity) -> bool {
        !self.problems.iter().any(|p| p.severity.meets(threshold))
    }

    /// Problem count per severity, ordered `(hints, warnings, errors)`.
    #[must_use]
    pub fn severity_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for problem in &self.problems {
            match problem.severity {
                Severity::Hint => counts.0 += 1,
                Severity::Warning => counts.1 += 1,
                Severity::Error => counts.2 += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, HintId};

    fn problem(hint: &str, severity: Severity) -> Problem {
        Problem::new(
            HintId::new(hint).expect("valid hint id"),
            "https://example.com/",
            "message",
            severity,
            Category::Other,
        )
    }

    #[test]
    fn test_filter_at_threshold() {
        let result = AnalyzerResult::new(
            "https://example.com/",
            vec![
                problem("hint-a", Severity::Error),
                problem("hint-b", Severity::Hint),
            ],
        );

        let retained = result.filter_at(Severity::Warning);
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].hint_id.as_str(), "hint-a");
    }

    #[test]
    fn test_passed() {
        let result = AnalyzerResult::new(
            "https://example.com/",
            vec![problem("hint-a", Severity::Warning)],
        );

        assert!(result.passed(Severity::Error));
        assert!(!result.passed(Severity::Warning));
        assert!(!result.passed(Severity::Hint));

        let clean = AnalyzerResult::new("https://example.com/", Vec::new());
        assert!(clean.passed(Severity::Hint));
    }

    #[test]
    fn test_severity_counts() {
        let result = AnalyzerResult::new(
            "https://example.com/",
            vec![
                problem("hint-a", Severity::Hint),
                problem("hint-b", Severity::Warning),
                problem("hint-c", Severity::Warning),
                problem("hint-d", Severity::Error),
            ],
        );
        assert_eq!(result.severity_counts(), (1, 2, 1));
    }

    #[test]
    fn test_finished_at_stamped_on_creation() {
        let before = Timestamp::now();
        let result = AnalyzerResult::new("https://example.com/", Vec::new());
        let after = Timestamp::now();

        assert!(result.finished_at >= before);
        assert!(result.finished_at <= after);
    }

    #[test]
    fn test_json_round_trip() {
        let result = AnalyzerResult::new(
            "https://example.com/",
            vec![problem("hint-a", Severity::Error)],
        );
        let json = serde_json::to_string(&result).expect("serialize result");
        let parsed: AnalyzerResult = serde_json::from_str(&json).expect("deserialize result");
        assert_eq!(parsed, result);
    }
}
