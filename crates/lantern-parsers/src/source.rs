//! Source parsers for CSS and JavaScript.
//!
//! These kinds have no structured AST here; the parser relays the fetched
//! text as a `parse::end::<kind>` source payload so hints can run their own
//! heuristics over it.

use lantern_core::MediaKind;
use lantern_events::{AstPayload, Event, ListenerError, TopicPattern};
use lantern_resources::{Parser, ParserContext, ParserFactory};
use std::sync::Arc;

struct SourceParser {
    name: &'static str,
}

impl Parser for SourceParser {
    fn name(&self) -> &str {
        self.name
    }
}

/// Factory for a parser that relays raw source of one media kind.
#[derive(Debug)]
pub struct SourceParserFactory {
    name: &'static str,
    kind: MediaKind,
}

impl SourceParserFactory {
    /// The CSS source parser.
    #[must_use]
    pub fn css() -> Self {
        Self {
            name: "css",
            kind: MediaKind::Css,
        }
    }

    /// The JavaScript source parser.
    #[must_use]
    pub fn javascript() -> Self {
        Self {
            name: "javascript",
            kind: MediaKind::Javascript,
        }
    }
}

impl ParserFactory for SourceParserFactory {
    fn name(&self) -> &str {
        self.name
    }

    fn create(&self, context: &ParserContext) -> Arc<dyn Parser> {
        let bus = context.bus.clone();
        let kind = self.kind;
        let pattern = TopicPattern::parse(&format!("fetch::end::{}", kind.as_str()))
            .expect("valid fetch::end pattern");

        context.bus.on(pattern, move |event| {
            let bus = bus.clone();
            Box::pin(async move {
                let Event::FetchEnd { network } = event else {
                    return Ok(());
                };
                let resource = network.resource.clone();

                bus.emit_awaited(Event::ParseStart {
                    kind,
                    resource: resource.clone(),
                })
                .await
                .map_err(|e| ListenerError::new(e.to_string()))?;

                bus.emit_awaited(Event::ParseEnd {
                    kind,
                    resource,
                    payload: AstPayload::Source {
                        text: Arc::new(network.response.body.content.clone()),
                    },
                })
                .await
                .map_err(|e| ListenerError::new(e.to_string()))
            })
        });

        Arc::new(SourceParser { name: self.name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::{Headers, NetworkData, Request, Response, ResponseBody};
    use lantern_events::EventBus;
    use std::sync::Mutex;

    fn fetch(kind: MediaKind, body: &str) -> Event {
        Event::FetchEnd {
            network: Arc::new(NetworkData {
                resource: "https://example.com/app.js".to_string(),
                request: Request::new("https://example.com/app.js"),
                response: Response {
                    url: "https://example.com/app.js".to_string(),
                    status: 200,
                    headers: Headers::new(),
                    body: ResponseBody::from_text(body),
                    media_kind: kind,
                },
            }),
        }
    }

    #[tokio::test]
    async fn test_javascript_source_relayed() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        bus.on(
            TopicPattern::parse("parse::end::javascript").expect("valid pattern"),
            move |event| {
                let log = Arc::clone(&log);
                Box::pin(async move {
                    if let Event::ParseEnd { payload, .. } = event {
                        let text = payload.as_source().expect("source payload").to_string();
                        log.lock().expect("lock").push(text);
                    }
                    Ok(())
                })
            },
        );

        let context = ParserContext { bus: bus.clone() };
        let parser = SourceParserFactory::javascript().create(&context);
        assert_eq!(parser.name(), "javascript");

        bus.emit_awaited(fetch(MediaKind::Javascript, "var x = 1;"))
            .await
            .expect("dispatch");

        assert_eq!(*seen.lock().expect("lock"), vec!["var x = 1;".to_string()]);
    }

    #[tokio::test]
    async fn test_css_parser_ignores_javascript() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&count);
        bus.on(
            TopicPattern::parse("parse::**").expect("valid pattern"),
            move |_event| {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    *counter.lock().expect("lock") += 1;
                    Ok(())
                })
            },
        );

        let context = ParserContext { bus: bus.clone() };
        let _parser = SourceParserFactory::css().create(&context);

        bus.emit_awaited(fetch(MediaKind::Javascript, "var x = 1;"))
            .await
            .expect("dispatch");

        assert_eq!(*count.lock().expect("lock"), 0);
    }
}
