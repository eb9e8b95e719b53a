//! The web app manifest parser.
//!
//! Subscribes to `fetch::end::manifest` and emits the parsed JSON document.
//! A manifest that fails to parse is logged and produces no `parse::end`;
//! hints that require a manifest simply never fire for that scan.

use lantern_core::MediaKind;
use lantern_events::{AstPayload, Event, ListenerError, TopicPattern};
use lantern_resources::{Parser, ParserContext, ParserFactory};
use std::sync::Arc;
use tracing::warn;

struct ManifestParser;

impl Parser for ManifestParser {
    fn name(&self) -> &str {
        "manifest"
    }
}

/// Factory for the built-in manifest parser.
#[derive(Debug, Default)]
pub struct ManifestParserFactory;

impl ParserFactory for ManifestParserFactory {
    fn name(&self) -> &str {
        "manifest"
    }

    fn create(&self, context: &ParserContext) -> Arc<dyn Parser> {
        let bus = context.bus.clone();
        context.bus.on(
            TopicPattern::parse("fetch::end::manifest").expect("valid fetch::end::manifest pattern"),
            move |event| {
                let bus = bus.clone();
                Box::pin(async move {
                    let Event::FetchEnd { network } = event else {
                        return Ok(());
                    };
                    let resource = network.resource.clone();

                    bus.emit_awaited(Event::ParseStart {
                        kind: MediaKind::Manifest,
                        resource: resource.clone(),
                    })
                    .await
                    .map_err(|e| ListenerError::new(e.to_string()))?;

                    let value: serde_json::Value =
                        match serde_json::from_str(&network.response.body.content) {
                            Ok(value) => value,
                            Err(e) => {
                                warn!(resource = %resource, error = %e, "manifest is not valid JSON");
                                return Ok(());
                            }
                        };

                    bus.emit_awaited(Event::ParseEnd {
                        kind: MediaKind::Manifest,
                        resource,
                        payload: AstPayload::Json {
                            value: Arc::new(value),
                        },
                    })
                    .await
                    .map_err(|e| ListenerError::new(e.to_string()))
                })
            },
        );
        Arc::new(ManifestParser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::{Headers, NetworkData, Request, Response, ResponseBody};
    use lantern_events::EventBus;
    use std::sync::Mutex;

    fn manifest_fetch(body: &str) -> Event {
        Event::FetchEnd {
            network: Arc::new(NetworkData {
                resource: "https://example.com/site.webmanifest".to_string(),
                request: Request::new("https://example.com/site.webmanifest"),
                response: Response {
                    url: "https://example.com/site.webmanifest".to_string(),
                    status: 200,
                    headers: Headers::new(),
                    body: ResponseBody::from_text(body),
                    media_kind: MediaKind::Manifest,
                },
            }),
        }
    }

    #[tokio::test]
    async fn test_valid_manifest_parsed() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        bus.on(
            TopicPattern::parse("parse::end::manifest").expect("valid pattern"),
            move |event| {
                let log = Arc::clone(&log);
                Box::pin(async move {
                    if let Event::ParseEnd { payload, .. } = event {
                        let name = payload
                            .as_json()
                            .and_then(|v| v.get("name"))
                            .and_then(|v| v.as_str())
                            .map(str::to_string);
                        log.lock().expect("lock").push(name);
                    }
                    Ok(())
                })
            },
        );

        let context = ParserContext { bus: bus.clone() };
        let parser = ManifestParserFactory.create(&context);
        assert_eq!(parser.name(), "manifest");

        bus.emit_awaited(manifest_fetch(r#"{"name": "Demo App"}"#))
            .await
            .expect("dispatch");

        assert_eq!(
            *seen.lock().expect("lock"),
            vec![Some("Demo App".to_string())]
        );
    }

    #[tokio::test]
    async fn test_invalid_manifest_produces_start_but_no_end() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let entries = Arc::clone(&log);
        bus.on(
            TopicPattern::parse("parse::**").expect("valid pattern"),
            move |event| {
                let entries = Arc::clone(&entries);
                Box::pin(async move {
                    let label = match event {
                        Event::ParseStart { .. } => "start",
                        Event::ParseEnd { .. } => "end",
                        _ => "other",
                    };
                    entries.lock().expect("lock").push(label);
                    Ok(())
                })
            },
        );

        let context = ParserContext { bus: bus.clone() };
        let _parser = ManifestParserFactory.create(&context);

        bus.emit_awaited(manifest_fetch("{not json"))
            .await
            .expect("invalid manifest must not fail the dispatch");

        assert_eq!(*log.lock().expect("lock"), vec!["start"]);
    }
}
