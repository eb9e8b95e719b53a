//! `minified-js`: shipped JavaScript should be minified.
//!
//! A cheap structural heuristic: minified bundles pack code into very long
//! lines, so a script whose average line length stays short was probably
//! shipped as authored. The `threshold` option is that average in
//! characters; tiny files are skipped outright since minifying them buys
//! nothing measurable.

use lantern_core::{Category, HintId};
use lantern_events::{Event, TopicPattern};
use lantern_resources::{FieldKind, Hint, HintContext, HintFactory, HintMeta, OptionsSchema};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const HINT_ID: &str = "minified-js";

/// Minimum average line length, in characters, to consider a file minified.
const DEFAULT_THRESHOLD: f64 = 80.0;

/// Files smaller than this are not worth flagging.
const MIN_CONTENT_BYTES: usize = 512;

/// Average characters per non-empty line.
fn average_line_length(source: &str) -> f64 {
    let mut lines = 0usize;
    let mut chars = 0usize;
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        lines += 1;
        chars += trimmed.chars().count();
    }
    if lines == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        chars as f64 / lines as f64
    }
}

struct MinifiedJs {
    id: HintId,
}

impl Hint for MinifiedJs {
    fn id(&self) -> &HintId {
        &self.id
    }
}

/// Factory for `minified-js`.
#[derive(Debug)]
pub struct MinifiedJsFactory {
    meta: HintMeta,
}

impl Default for MinifiedJsFactory {
    fn default() -> Self {
        Self {
            meta: HintMeta {
                id: HintId::new(HINT_ID).expect("valid hint id"),
                description: "Require JavaScript to be delivered minified".to_string(),
                category: Category::Performance,
                schema: OptionsSchema::empty().field("threshold", FieldKind::Number),
                docs_url: None,
            },
        }
    }
}

impl HintFactory for MinifiedJsFactory {
    fn meta(&self) -> &HintMeta {
        &self.meta
    }

    fn create(&self, context: Arc<HintContext>) -> Arc<dyn Hint> {
        let threshold = context
            .options()
            .get("threshold")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(DEFAULT_THRESHOLD);

        let reported: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        let ctx = Arc::clone(&context);
        context.on(
            TopicPattern::parse("parse::end::javascript").expect("valid pattern"),
            move |event| {
                let ctx = Arc::clone(&ctx);
                let reported = Arc::clone(&reported);
                Box::pin(async move {
                    let Event::ParseEnd {
                        resource, payload, ..
                    } = event
                    else {
                        return Ok(());
                    };
                    let Some(source) = payload.as_source() else {
                        return Ok(());
                    };

                    if source.len() < MIN_CONTENT_BYTES {
                        return Ok(());
                    }

                    let average = average_line_length(source);
                    if average >= threshold {
                        return Ok(());
                    }

                    if reported
                        .lock()
                        .expect("acquire dedup lock")
                        .insert(resource.clone())
                    {
                        ctx.report(
                            resource,
                            format!(
                                "JavaScript appears to be unminified \
                                 (average line length {average:.0} < {threshold:.0})"
                            ),
                        );
                    }

                    Ok(())
                })
            },
        );

        Arc::new(MinifiedJs {
            id: self.meta.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::harness;
    use lantern_core::{MediaKind, Severity};
    use lantern_events::AstPayload;

    async fn problems_for(options: serde_json::Value, source: &str) -> Vec<lantern_core::Problem> {
        let (bus, sink) = harness(&MinifiedJsFactory::default(), options, Severity::Hint);
        bus.emit_awaited(Event::ParseEnd {
            kind: MediaKind::Javascript,
            resource: "https://example.com/app.js".to_string(),
            payload: AstPayload::Source {
                text: Arc::new(source.to_string()),
            },
        })
        .await
        .expect("dispatch");
        sink.take()
    }

    fn unminified_source() -> String {
        "function add(left, right) {\n    return left + right;\n}\n".repeat(20)
    }

    fn minified_source() -> String {
        let line = "function add(a,b){return a+b}".repeat(10);
        format!("{line}\n{line}\n")
    }

    #[tokio::test]
    async fn test_unminified_source_reported() {
        let problems = problems_for(serde_json::Value::Null, &unminified_source()).await;
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("unminified"));
    }

    #[tokio::test]
    async fn test_minified_source_passes() {
        let problems = problems_for(serde_json::Value::Null, &minified_source()).await;
        assert!(problems.is_empty(), "unexpected problems: {problems:?}");
    }

    #[tokio::test]
    async fn test_small_files_skipped() {
        let problems = problems_for(serde_json::Value::Null, "var x = 1;\n").await;
        assert!(problems.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_option_honored() {
        // A permissive threshold accepts the unminified fixture
        let problems =
            problems_for(serde_json::json!({ "threshold": 10.0 }), &unminified_source()).await;
        assert!(problems.is_empty(), "unexpected problems: {problems:?}");
    }

    #[test]
    fn test_average_line_length_ignores_blank_lines() {
        assert!((average_line_length("aaaa\n\n\nbb\n") - 3.0).abs() < f64::EPSILON);
        assert!(average_line_length("").abs() < f64::EPSILON);
    }
}
