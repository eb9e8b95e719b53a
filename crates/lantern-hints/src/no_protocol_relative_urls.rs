//! `no-protocol-relative-urls`: references must pin a scheme.
//!
//! A `//host/path` reference inherits the scheme of the embedding page,
//! which downgrades to plain HTTP when the page is served insecurely or
//! opened from disk. The hint watches every traversed element's `href` and
//! `src` attributes.

use lantern_core::{Category, HintId};
use lantern_events::{Event, TopicPattern};
use lantern_resources::{Hint, HintContext, HintFactory, HintMeta, OptionsSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const HINT_ID: &str = "no-protocol-relative-urls";

// Two slashes then an authority; three or more is a pathological path, not
// a protocol-relative reference
static PROTOCOL_RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//[^/]").expect("valid protocol-relative pattern"));

struct NoProtocolRelativeUrls {
    id: HintId,
}

impl Hint for NoProtocolRelativeUrls {
    fn id(&self) -> &HintId {
        &self.id
    }
}

/// Factory for `no-protocol-relative-urls`.
#[derive(Debug)]
pub struct NoProtocolRelativeUrlsFactory {
    meta: HintMeta,
}

impl Default for NoProtocolRelativeUrlsFactory {
    fn default() -> Self {
        Self {
            meta: HintMeta {
                id: HintId::new(HINT_ID).expect("valid hint id"),
                description: "Disallow protocol-relative URLs in href and src attributes"
                    .to_string(),
                category: Category::Security,
                schema: OptionsSchema::empty(),
                docs_url: None,
            },
        }
    }
}

impl HintFactory for NoProtocolRelativeUrlsFactory {
    fn meta(&self) -> &HintMeta {
        &self.meta
    }

    fn create(&self, context: Arc<HintContext>) -> Arc<dyn Hint> {
        let reported: Arc<Mutex<HashSet<(String, String)>>> =
            Arc::new(Mutex::new(HashSet::new()));

        let ctx = Arc::clone(&context);
        context.on(
            TopicPattern::parse("element::*").expect("valid pattern"),
            move |event| {
                let ctx = Arc::clone(&ctx);
                let reported = Arc::clone(&reported);
                Box::pin(async move {
                    let Event::Element { resource, element } = event else {
                        return Ok(());
                    };

                    for attr in ["href", "src"] {
                        let Some(value) = element.attribute(attr) else {
                            continue;
                        };
                        if !PROTOCOL_RELATIVE.is_match(value) {
                            continue;
                        }
                        let key = (resource.clone(), value.to_string());
                        if !reported.lock().expect("acquire dedup lock").insert(key) {
                            continue;
                        }
                        let tag = element.tag_name().unwrap_or("unknown");
                        ctx.report_problem(
                            ctx.problem(
                                resource.clone(),
                                format!("'{value}' is a protocol-relative URL"),
                            )
                            .with_snippet(format!("<{tag} {attr}=\"{value}\">")),
                        );
                    }

                    Ok(())
                })
            },
        );

        Arc::new(NoProtocolRelativeUrls {
            id: self.meta.id.clone(),
        })
    }
}
