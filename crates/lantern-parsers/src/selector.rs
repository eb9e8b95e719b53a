//! A small CSS-ish selector over arena snapshots.
//!
//! Supports compound simple selectors only: `tag`, `#id`, `.class`,
//! `[attr]`, `[attr=value]`, and combinations such as
//! `meta[charset="utf-8"]`. No combinators; connectors expose this through
//! `query_selector_all` for hints that inspect the collected document
//! directly.

use lantern_core::{DomSnapshot, NodeId};
use thiserror::Error;

/// Errors from parsing a selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Empty selector string
    #[error("selector must not be empty")]
    Empty,

    /// Something the simple grammar does not cover
    #[error("unsupported selector syntax at '{rest}' in '{selector}'")]
    Unsupported {
        /// The full selector
        selector: String,
        /// Where parsing stopped
        rest: String,
    },
}

/// One parsed compound simple selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    /// (name, required value); `None` value means presence-only
    attributes: Vec<(String, Option<String>)>,
}

impl SimpleSelector {
    /// Parse a selector string.
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let input = selector.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }

        let unsupported = |rest: &str| SelectorError::Unsupported {
            selector: selector.to_string(),
            rest: rest.to_string(),
        };

        let mut parsed = Self::default();
        let mut rest = input;

        // Leading tag name
        let tag_len = rest
            .find(['#', '.', '['])
            .unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(unsupported(rest));
            }
            parsed.tag = Some(tag.to_ascii_lowercase());
            rest = &rest[tag_len..];
        }

        while !rest.is_empty() {
            let (marker, tail) = rest.split_at(1);
            match marker {
                "#" | "." => {
                    let end = tail.find(['#', '.', '[']).unwrap_or(tail.len());
                    let name = &tail[..end];
                    if name.is_empty() {
                        return Err(unsupported(rest));
                    }
                    if marker == "#" {
                        parsed.id = Some(name.to_string());
                    } else {
                        parsed.classes.push(name.to_string());
                    }
                    rest = &tail[end..];
                }
                "[" => {
                    let Some(end) = tail.find(']') else {
                        return Err(unsupported(rest));
                    };
                    let body = &tail[..end];
                    let (name, value) = match body.split_once('=') {
                        None => (body, None),
                        Some((name, value)) => {
                            let value = value.trim_matches(|c| c == '"' || c == '\'');
                            (name, Some(value.to_string()))
                        }
                    };
                    if name.is_empty() {
                        return Err(unsupported(rest));
                    }
                    parsed
                        .attributes
                        .push((name.to_ascii_lowercase(), value));
                    rest = &tail[end + 1..];
                }
                _ => return Err(unsupported(rest)),
            }
        }

        Ok(parsed)
    }

    /// Whether an element in `snapshot` matches.
    #[must_use]
    pub fn matches(&self, snapshot: &DomSnapshot, id: NodeId) -> bool {
        let Some(tag) = snapshot.tag_name(id) else {
            return false;
        };

        if let Some(wanted) = &self.tag {
            if tag != wanted {
                return false;
            }
        }

        if let Some(wanted) = &self.id {
            if snapshot.attribute(id, "id") != Some(wanted.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let classes = snapshot.attribute(id, "class").unwrap_or_default();
            let have: Vec<&str> = classes.split_whitespace().collect();
            if !self.classes.iter().all(|c| have.contains(&c.as_str())) {
                return false;
            }
        }

        for (name, value) in &self.attributes {
            match (snapshot.attribute(id, name), value) {
                (None, _) => return false,
                (Some(_), None) => {}
                (Some(actual), Some(wanted)) if actual == wanted => {}
                _ => return false,
            }
        }

        true
    }

    /// All matching elements in document order.
    #[must_use]
    pub fn select(&self, snapshot: &DomSnapshot) -> Vec<NodeId> {
        snapshot
            .elements()
            .filter(|id| self.matches(snapshot, *id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::build_snapshot;

    fn sample() -> DomSnapshot {
        build_snapshot(
            "https://example.com/",
            r#"<html><head><meta charset="utf-8"></head>
               <body>
                 <p id="intro" class="lead big">one</p>
                 <p class="lead">two</p>
                 <a href="//cdn.example.com/x.js">link</a>
               </body></html>"#,
        )
    }

    fn select<'a>(snapshot: &DomSnapshot, selector: &str) -> Vec<String> {
        SimpleSelector::parse(selector)
            .expect("valid selector")
            .select(snapshot)
            .into_iter()
            .filter_map(|id| snapshot.tag_name(id).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_tag_selector() {
        let snapshot = sample();
        assert_eq!(select(&snapshot, "p"), vec!["p", "p"]);
        assert_eq!(select(&snapshot, "meta"), vec!["meta"]);
        assert!(select(&snapshot, "video").is_empty());
    }

    #[test]
    fn test_id_selector() {
        let snapshot = sample();
        assert_eq!(select(&snapshot, "#intro"), vec!["p"]);
        assert_eq!(select(&snapshot, "p#intro"), vec!["p"]);
        assert!(select(&snapshot, "a#intro").is_empty());
    }

    #[test]
    fn test_class_selector() {
        let snapshot = sample();
        assert_eq!(select(&snapshot, ".lead").len(), 2);
        assert_eq!(select(&snapshot, ".lead.big").len(), 1);
        assert_eq!(select(&snapshot, "p.big"), vec!["p"]);
    }

    #[test]
    fn test_attribute_selector() {
        let snapshot = sample();
        assert_eq!(select(&snapshot, "[charset]"), vec!["meta"]);
        assert_eq!(select(&snapshot, "meta[charset=\"utf-8\"]"), vec!["meta"]);
        assert!(select(&snapshot, "meta[charset=\"latin1\"]").is_empty());
        assert_eq!(select(&snapshot, "a[href]"), vec!["a"]);
    }

    #[test]
    fn test_unsupported_syntax_rejected() {
        assert!(SimpleSelector::parse("").is_err());
        assert!(SimpleSelector::parse("p > a").is_err());
        assert!(SimpleSelector::parse("a[href").is_err());
        assert!(SimpleSelector::parse("p:first-child").is_err());
    }
}
