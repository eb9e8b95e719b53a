//! Reported findings and their severities.
//!
//! A [`Problem`] is one immutable finding reported by one hint against one
//! resource. Problems are recorded unconditionally during a scan; severity
//! threshold filtering happens at the output stage so nothing a hint saw is
//! lost before reporting.

use crate::error::LanternError;
use crate::types::{Category, HintId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a reported problem, ordered from least to most severe.
///
/// The ordinal values (hint=0, warning=1, error=2) drive threshold
/// comparisons: a scan fails when any problem's severity is at or above the
/// configured threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory finding, does not fail a scan by default
    Hint,
    /// Something worth fixing
    #[default]
    Warning,
    /// Something broken
    Error,
}

impl Severity {
    /// Numeric ordinal used by threshold comparisons.
    #[must_use]
    pub fn as_ordinal(&self) -> u8 {
        match self {
            Self::Hint => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }

    /// Lowercase name as used in configuration files and topic payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Whether this severity meets the given threshold.
    #[must_use]
    pub fn meets(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LanternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hint" => Ok(Self::Hint),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(LanternError::Validation(format!(
                "unknown severity '{other}', expected hint, warning, or error"
            ))),
        }
    }
}

/// Source position of a finding, 1-based line and column.
///
/// `end_line`/`end_column` are present when the finding spans a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemLocation {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// 1-based end line, for range findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// 1-based end column, for range findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl ProblemLocation {
    /// Create a point location.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Create a range location.
    #[must_use]
    pub fn range(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            line,
            column,
            end_line: Some(end_line),
            end_column: Some(end_column),
        }
    }
}

impl fmt::Display for ProblemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A suggested fix: replacement text for a located span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// Where the replacement applies
    pub location: ProblemLocation,
    /// The replacement text
    pub replacement: String,
}

/// A documentation link attached to a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLink {
    /// Optional human-readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Link target
    pub url: String,
}

/// One reported finding.
///
/// Invariant: every problem is attributable to exactly one resource and one
/// hint identity. Duplicate suppression is each hint's responsibility; the
/// engine records everything it is handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Identity of the hint that reported this problem
    pub hint_id: HintId,
    /// URL of the resource the problem was found in
    pub resource: String,
    /// Human-readable description of the finding
    pub message: String,
    /// Severity the problem was recorded at
    pub severity: Severity,
    /// Category inherited from the reporting hint
    pub category: Category,
    /// Source position, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ProblemLocation>,
    /// Offending source excerpt, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Suggested fixes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<Fix>,
    /// Documentation links
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<DocLink>,
}

impl Problem {
    /// Create a problem with the required fields.
    #[must_use]
    pub fn new(
        hint_id: HintId,
        resource: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        category: Category,
    ) -> Self {
        Self {
            hint_id,
            resource: resource.into(),
            message: message.into(),
            severity,
            category,
            location: None,
            snippet: None,
            fixes: Vec::new(),
            docs: Vec::new(),
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn with_location(mut self, location: ProblemLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a source excerpt.
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Attach a suggested fix.
    #[must_use]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fixes.push(fix);
        self
    }

    /// Attach a documentation link.
    #[must_use]
    pub fn with_doc(mut self, url: impl Into<String>, label: Option<String>) -> Self {
        self.docs.push(DocLink {
            label,
            url: url.into(),
        });
        self
    }

    /// Grouping key: resource plus hint identity.
    #[must_use]
    pub fn group_key(&self) -> (&str, &HintId) {
        (self.resource.as_str(), &self.hint_id)
    }
}
