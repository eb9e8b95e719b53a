//! `no-disallowed-headers`: responses must not leak stack details.
//!
//! Inspects the headers of every completed fetch for entries on a blocklist.
//! The defaults name headers that advertise the server-side technology;
//! `disallow` replaces the list and `ignore` subtracts from it.

use lantern_core::{Category, HintId};
use lantern_events::{Event, TopicPattern};
use lantern_resources::{FieldKind, Hint, HintContext, HintFactory, HintMeta, OptionsSchema};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const HINT_ID: &str = "no-disallowed-headers";

const DEFAULT_DISALLOWED: &[&str] = &["x-powered-by", "x-aspnet-version", "x-aspnetmvc-version"];

fn string_list(options: &serde_json::Value, key: &str) -> Option<Vec<String>> {
    options.get(key)?.as_array().map(|values| {
        values
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_ascii_lowercase)
            .collect()
    })
}

struct NoDisallowedHeaders {
    id: HintId,
}

impl Hint for NoDisallowedHeaders {
    fn id(&self) -> &HintId {
        &self.id
    }
}

/// Factory for `no-disallowed-headers`.
#[derive(Debug)]
pub struct NoDisallowedHeadersFactory {
    meta: HintMeta,
}

impl Default for NoDisallowedHeadersFactory {
    fn default() -> Self {
        Self {
            meta: HintMeta {
                id: HintId::new(HINT_ID).expect("valid hint id"),
                description: "Disallow response headers that disclose server technology"
                    .to_string(),
                category: Category::Security,
                schema: OptionsSchema::empty()
                    .field("disallow", FieldKind::StringList)
                    .field("ignore", FieldKind::StringList),
                docs_url: None,
            },
        }
    }
}

impl HintFactory for NoDisallowedHeadersFactory {
    fn meta(&self) -> &HintMeta {
        &self.meta
    }

    fn create(&self, context: Arc<HintContext>) -> Arc<dyn Hint> {
        let disallow = string_list(context.options(), "disallow")
            .unwrap_or_else(|| DEFAULT_DISALLOWED.iter().map(|s| (*s).to_string()).collect());
        let ignore: HashSet<String> = string_list(context.options(), "ignore")
            .unwrap_or_default()
            .into_iter()
            .collect();
        let watched: Arc<Vec<String>> = Arc::new(
            disallow
                .into_iter()
                .filter(|name| !ignore.contains(name))
                .collect(),
        );

        let reported: Arc<Mutex<HashSet<(String, String)>>> =
            Arc::new(Mutex::new(HashSet::new()));

        let ctx = Arc::clone(&context);
        context.on(
            TopicPattern::parse("fetch::end::*").expect("valid pattern"),
            move |event| {
                let ctx = Arc::clone(&ctx);
                let watched = Arc::clone(&watched);
                let reported = Arc::clone(&reported);
                Box::pin(async move {
                    let Event::FetchEnd { network } = event else {
                        return Ok(());
                    };

                    for name in watched.iter() {
                        let Some(value) = network.response.headers.get(name) else {
                            continue;
                        };
                        let key = (network.resource.clone(), name.clone());
                        if !reported.lock().expect("acquire dedup lock").insert(key) {
                            continue;
                        }
                        ctx.report_problem(
                            ctx.problem(
                                network.resource.clone(),
                                format!("Response includes disallowed header '{name}'"),
                            )
                            .with_snippet(format!("{name}: {value}")),
                        );
                    }

                    Ok(())
                })
            },
        );

        Arc::new(NoDisallowedHeaders {
            id: self.meta.id.clone(),
        })
    }
}
