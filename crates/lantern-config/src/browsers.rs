//! Browser target query resolution.
//!
//! Queries like `"chrome >= 100"` resolve to a concrete list of browser
//! identifiers (`chrome 100`, `chrome 101`, ...) handed to
//! compatibility-checking hints. The version table is a bundled snapshot of
//! current stable versions, not a live data source.

use crate::error::{ConfigurationError, Result};

/// Known browsers and the range of versions the bundled table covers,
/// `(name, oldest, newest)`.
const KNOWN_BROWSERS: &[(&str, u32, u32)] = &[
    ("chrome", 90, 127),
    ("edge", 90, 127),
    ("firefox", 78, 129),
    ("safari", 13, 17),
    ("opera", 76, 112),
    ("samsung", 13, 25),
];

/// The browser set the `defaults` query expands to: the latest two versions
/// of each major engine.
const DEFAULTS_LAST_VERSIONS: usize = 2;
const DEFAULTS_BROWSERS: &[&str] = &["chrome", "edge", "firefox", "safari"];

fn browser_range(name: &str) -> Option<(u32, u32)> {
    KNOWN_BROWSERS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, oldest, newest)| (*oldest, *newest))
}

fn push_versions(out: &mut Vec<String>, name: &str, from: u32, to: u32) {
    for version in from..=to {
        out.push(format!("{name} {version}"));
    }
}

/// Resolve one query into concrete `<name> <version>` identifiers.
///
/// Supported forms: `defaults`, `<name> <version>`, `<name> >= <version>`,
/// and `<name> <from>-<to>`. Names are matched case-insensitively.
fn resolve_query(query: &str) -> Result<Vec<String>> {
    let normalized = query.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(ConfigurationError::InvalidBrowserQuery {
            query: query.to_string(),
            reason: "query is empty".to_string(),
        });
    }

    if normalized == "defaults" {
        let mut out = Vec::new();
        for name in DEFAULTS_BROWSERS {
            let (_, newest) = browser_range(name).expect("defaults browsers are in the table");
            let from = newest.saturating_sub(DEFAULTS_LAST_VERSIONS as u32 - 1);
            push_versions(&mut out, name, from, newest);
        }
        return Ok(out);
    }

    let mut parts = normalized.split_whitespace();
    let name = parts.next().expect("non-empty query has a first token");
    let Some((oldest, newest)) = browser_range(name) else {
        return Err(ConfigurationError::InvalidBrowserQuery {
            query: query.to_string(),
            reason: format!("unknown browser '{name}'"),
        });
    };

    let rest: Vec<&str> = parts.collect();
    let invalid = |reason: String| ConfigurationError::InvalidBrowserQuery {
        query: query.to_string(),
        reason,
    };

    let mut out = Vec::new();
    match rest.as_slice() {
        // `chrome >= 100`
        [">=", version] => {
            let version: u32 = version
                .parse()
                .map_err(|_| invalid(format!("'{version}' is not a version number")))?;
            if version > newest {
                return Err(ConfigurationError::EmptyBrowserQuery {
                    query: query.to_string(),
                });
            }
            push_versions(&mut out, name, version.max(oldest), newest);
        }
        // `chrome 100-110` or `chrome 100`
        [spec] => {
            if let Some((from, to)) = spec.split_once('-') {
                let from: u32 = from
                    .parse()
                    .map_err(|_| invalid(format!("'{from}' is not a version number")))?;
                let to: u32 = to
                    .parse()
                    .map_err(|_| invalid(format!("'{to}' is not a version number")))?;
                if from > to {
                    return Err(invalid(format!("range {from}-{to} is inverted")));
                }
                if from > newest || to < oldest {
                    return Err(ConfigurationError::EmptyBrowserQuery {
                        query: query.to_string(),
                    });
                }
                push_versions(&mut out, name, from.max(oldest), to.min(newest));
            } else {
                let version: u32 = spec
                    .parse()
                    .map_err(|_| invalid(format!("'{spec}' is not a version number")))?;
                if version < oldest || version > newest {
                    return Err(ConfigurationError::EmptyBrowserQuery {
                        query: query.to_string(),
                    });
                }
                out.push(format!("{name} {version}"));
            }
        }
        [] => {
            return Err(invalid("missing version specifier".to_string()));
        }
        _ => {
            return Err(invalid("unrecognized query form".to_string()));
        }
    }

    Ok(out)
}

/// Resolve a list of queries into a deduplicated, ordered browser list.
///
/// An empty query list resolves to `defaults`. Any unparseable or
/// empty-resolving query fails the whole resolution.
pub fn resolve_browsers(queries: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();

    if queries.is_empty() {
        return resolve_query("defaults");
    }

    for query in queries {
        for id in resolve_query(query)? {
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }

    Ok(out)
}
