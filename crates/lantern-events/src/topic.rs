//! Topic grammar and pattern matching.
//!
//! Topics are `::`-delimited segment lists. Matching semantics are the
//! documented contract every subscriber relies on, so the matcher is explicit
//! and exhaustively tested rather than delegated to string prefix tricks.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Segment delimiter in topics and patterns.
pub const DELIMITER: &str = "::";

/// Errors from parsing topics or patterns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
    /// Empty input
    #[error("topic must not be empty")]
    Empty,

    /// An empty segment, such as `a::::b` or a trailing delimiter
    #[error("empty segment in '{0}'")]
    EmptySegment(String),

    /// A wildcard appeared in a concrete topic
    #[error("wildcard segment '{wildcard}' is not allowed in concrete topic '{topic}'")]
    WildcardInTopic {
        /// The offending segment
        wildcard: String,
        /// The full topic string
        topic: String,
    },

    /// `**` somewhere other than the final pattern segment
    #[error("'**' is only allowed as the final segment of a pattern, got '{0}'")]
    DescendantsNotLast(String),
}

/// A concrete, validated event topic such as `fetch::end::html`.
///
/// Case-sensitive; never contains wildcard segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    raw: String,
}

impl Topic {
    /// Parse and validate a concrete topic.
    pub fn new(raw: impl Into<String>) -> Result<Self, TopicError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TopicError::Empty);
        }
        for segment in raw.split(DELIMITER) {
            if segment.is_empty() {
                return Err(TopicError::EmptySegment(raw));
            }
            if segment.contains('*') {
                return Err(TopicError::WildcardInTopic {
                    wildcard: segment.to_string(),
                    topic: raw.clone(),
                });
            }
        }
        Ok(Self { raw })
    }

    /// Construct from a string already known to satisfy the topic grammar.
    ///
    /// Used for the fixed taxonomy constants in [`crate::event::topics`].
    pub(crate) fn from_validated(raw: String) -> Self {
        debug_assert!(Topic::new(raw.clone()).is_ok(), "invalid topic '{raw}'");
        Self { raw }
    }

    /// The full topic string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Iterate the topic's segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split(DELIMITER)
    }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Topic {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// One segment of a subscription pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    /// Matches only the identical topic segment
    Literal(String),
    /// `*`: matches any single topic segment
    AnyOne,
}

/// A subscription pattern such as `fetch::end::*` or `element::**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPattern {
    raw: String,
    segments: Vec<PatternSegment>,
    /// Trailing `**`: match one or more remaining segments
    descendants: bool,
}

impl TopicPattern {
    /// Parse and validate a subscription pattern.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TopicError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TopicError::Empty);
        }

        let parts: Vec<&str> = raw.split(DELIMITER).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut descendants = false;

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(TopicError::EmptySegment(raw));
            }
            match *part {
                "**" => {
                    if i + 1 != parts.len() {
                        return Err(TopicError::DescendantsNotLast(raw));
                    }
                    descendants = true;
                }
                "*" => segments.push(PatternSegment::AnyOne),
                literal => segments.push(PatternSegment::Literal(literal.to_string())),
            }
        }

        Ok(Self {
            raw,
            segments,
            descendants,
        })
    }

    /// Whether this pattern contains no wildcard segments.
    ///
    /// Exact subscriptions are dispatched before wildcard subscriptions for
    /// the same emitted topic.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        !self.descendants
            && self
                .segments
                .iter()
                .all(|s| matches!(s, PatternSegment::Literal(_)))
    }

    /// The pattern as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern matches a concrete topic.
    ///
    /// Without `**`: segment counts must be equal and every pattern segment
    /// must be `*` or equal to the topic segment. With a trailing `**`: the
    /// leading segments must match under the same rule and the topic must
    /// have at least one additional segment.
    #[must_use]
    pub fn matches(&self, topic: &Topic) -> bool {
        let topic_segments: Vec<&str> = topic.segments().collect();

        if self.descendants {
            if topic_segments.len() < self.segments.len() + 1 {
                return false;
            }
        } else if topic_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(topic_segments.iter())
            .all(|(pattern, actual)| match pattern {
                PatternSegment::AnyOne => true,
                PatternSegment::Literal(expected) => expected == actual,
            })
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for TopicPattern {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(raw: &str) -> Topic {
        Topic::new(raw).expect("valid topic")
    }

    fn pattern(raw: &str) -> TopicPattern {
        TopicPattern::parse(raw).expect("valid pattern")
    }

    #[test]
    fn test_topic_valid() {
        let valid = vec![
            "print",
            "scan::start",
            "fetch::end::html",
            "element::meta",
            "can-evaluate::script",
        ];
        for raw in valid {
            assert!(Topic::new(raw).is_ok(), "Failed for: {raw}");
        }
    }

    #[test]
    fn test_topic_invalid() {
        assert_eq!(Topic::new(""), Err(TopicError::Empty));
        assert!(matches!(
            Topic::new("fetch::::html"),
            Err(TopicError::EmptySegment(_))
        ));
        assert!(matches!(
            Topic::new("fetch::end::"),
            Err(TopicError::EmptySegment(_))
        ));
        assert!(matches!(
            Topic::new("fetch::*"),
            Err(TopicError::WildcardInTopic { .. })
        ));
    }

    #[test]
    fn test_topic_segments() {
        let t = topic("fetch::end::html");
        let segments: Vec<_> = t.segments().collect();
        assert_eq!(segments, vec!["fetch", "end", "html"]);
        assert_eq!(t.segment_count(), 3);
    }

    #[test]
    fn test_pattern_invalid() {
        assert_eq!(TopicPattern::parse(""), Err(TopicError::Empty));
        assert!(matches!(
            TopicPattern::parse("fetch::**::html"),
            Err(TopicError::DescendantsNotLast(_))
        ));
        assert!(matches!(
            TopicPattern::parse("fetch::::*"),
            Err(TopicError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_pattern_is_exact() {
        assert!(pattern("scan::start").is_exact());
        assert!(!pattern("fetch::end::*").is_exact());
        assert!(!pattern("fetch::**").is_exact());
        assert!(!pattern("*::start").is_exact());
    }

    // Matching table covering the documented grammar: equal-count literal
    // and single-wildcard behavior, descendant behavior, and the rejected
    // implicit-prefix cases.
    #[test]
    fn test_matching_table() {
        let cases: Vec<(&str, &str, bool)> = vec![
            // Exact
            ("scan::start", "scan::start", true),
            ("scan::start", "scan::end", false),
            ("scan::start", "scan::start::extra", false),
            ("print", "print", true),
            // Case-sensitivity
            ("scan::start", "Scan::start", false),
            // Single wildcard, equal counts required
            ("fetch::end::*", "fetch::end::html", true),
            ("fetch::end::*", "fetch::end::css", true),
            ("fetch::end::*", "fetch::end", false),
            ("fetch::end::*", "fetch::end::html::gz", false),
            ("a::*", "a::b", true),
            ("a::*", "a::b::c", false),
            ("*::*", "a::b", true),
            ("*::*", "a", false),
            ("*", "print", true),
            ("*", "scan::start", false),
            ("element::*", "element::meta", true),
            ("element::*", "parse::meta", false),
            // Embedded wildcard
            ("fetch::*::html", "fetch::end::html", true),
            ("fetch::*::html", "fetch::start::html", true),
            ("fetch::*::html", "fetch::end::css", false),
            // Descendants: one or more extra segments required
            ("fetch::**", "fetch::start", true),
            ("fetch::**", "fetch::end::html", true),
            ("fetch::**", "fetch", false),
            ("fetch::**", "parse::start", false),
            ("fetch::end::**", "fetch::end::html", true),
            ("fetch::end::**", "fetch::end", false),
            ("*::**", "fetch::end::html", true),
            ("*::**", "print", false),
            // No implicit prefix matching
            ("fetch", "fetch::start", false),
            ("fetch::end", "fetch::end::html", false),
        ];

        for (p, t, expected) in cases {
            let result = pattern(p).matches(&topic(t));
            assert_eq!(result, expected, "pattern '{p}' against topic '{t}'");
        }
    }
}
