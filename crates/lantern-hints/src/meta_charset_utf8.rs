//! `meta-charset-utf8`: the document must declare its encoding first.
//!
//! Checks each parsed HTML document for a `<meta charset="utf-8">` that is
//! the first element inside `<head>`. Declaring any other charset, or
//! declaring it late, lets browsers mis-decode bytes parsed before the
//! declaration.

use lantern_core::{Category, HintId};
use lantern_events::{Event, TopicPattern};
use lantern_resources::{Hint, HintContext, HintFactory, HintMeta, OptionsSchema};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const HINT_ID: &str = "meta-charset-utf8";

struct MetaCharsetUtf8 {
    id: HintId,
}

impl Hint for MetaCharsetUtf8 {
    fn id(&self) -> &HintId {
        &self.id
    }
}

/// Factory for `meta-charset-utf8`.
#[derive(Debug)]
pub struct MetaCharsetUtf8Factory {
    meta: HintMeta,
}

impl Default for MetaCharsetUtf8Factory {
    fn default() -> Self {
        Self {
            meta: HintMeta {
                id: HintId::new(HINT_ID).expect("valid hint id"),
                description: "Require a <meta charset=\"utf-8\"> as the first element in <head>"
                    .to_string(),
                category: Category::Compatibility,
                schema: OptionsSchema::empty(),
                docs_url: None,
            },
        }
    }
}

impl HintFactory for MetaCharsetUtf8Factory {
    fn meta(&self) -> &HintMeta {
        &self.meta
    }

    fn create(&self, context: Arc<HintContext>) -> Arc<dyn Hint> {
        let reported: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        let ctx = Arc::clone(&context);
        context.on(
            TopicPattern::parse("parse::end::html").expect("valid pattern"),
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
                    let Some(document) = payload.as_html() else {
                        return Ok(());
                    };

                    // One verdict per document
                    if !reported
                        .lock()
                        .expect("acquire dedup lock")
                        .insert(resource.clone())
                    {
                        return Ok(());
                    }

                    let Some(head) = document.elements_by_name("head").next() else {
                        ctx.report(resource, "The document has no <head> to declare a charset in");
                        return Ok(());
                    };

                    let head_elements: Vec<_> = document
                        .children(head)
                        .iter()
                        .copied()
                        .filter(|id| document.tag_name(*id).is_some())
                        .collect();

                    let charset_meta = head_elements.iter().copied().find(|id| {
                        document.tag_name(*id) == Some("meta")
                            && document.attribute(*id, "charset").is_some()
                    });

                    match charset_meta {
                        None => {
                            ctx.report(resource, "The document has no charset meta element");
                        }
                        Some(meta) => {
                            let value = document
                                .attribute(meta, "charset")
                                .unwrap_or_default()
                                .trim()
                                .to_ascii_lowercase();
                            if value != "utf-8" {
                                ctx.report_problem(
                                    ctx.problem(
                                        resource,
                                        format!("The charset should be 'utf-8', not '{value}'"),
                                    )
                                    .with_snippet(format!("<meta charset=\"{value}\">")),
                                );
                            } else if head_elements.first() != Some(&meta) {
                                ctx.report(
                                    resource,
                                    "The charset meta element should be the first element in <head>",
                                );
                            }
                        }
                    }

                    Ok(())
                })
            },
        );

        Arc::new(MetaCharsetUtf8 {
            id: self.meta.id.clone(),
        })
    }
}
