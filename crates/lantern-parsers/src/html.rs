//! The HTML parser resource.
//!
//! Subscribes to `fetch::end::html` and turns each fetched document into a
//! `parse::start::html` / `parse::end::html` pair, with the arena snapshot
//! attached to the end event.

use crate::snapshot::build_snapshot;
use lantern_events::{Event, ListenerError, TopicPattern};
use lantern_resources::{Parser, ParserContext, ParserFactory};
use std::sync::Arc;

struct HtmlParser;

impl Parser for HtmlParser {
    fn name(&self) -> &str {
        "html"
    }
}

/// Factory for the built-in HTML parser.
#[derive(Debug, Default)]
pub struct HtmlParserFactory;

impl ParserFactory for HtmlParserFactory {
    fn name(&self) -> &str {
        "html"
    }

    fn create(&self, context: &ParserContext) -> Arc<dyn Parser> {
        let bus = context.bus.clone();
        context.bus.on(
            TopicPattern::parse("fetch::end::html").expect("valid fetch::end::html pattern"),
            move |event| {
                let bus = bus.clone();
                Box::pin(async move {
                    let Event::FetchEnd { network } = event else {
                        return Ok(());
                    };
                    let resource = network.resource.clone();

                    bus.emit_awaited(Event::ParseStart {
                        kind: lantern_core::MediaKind::Html,
                        resource: resource.clone(),
                    })
                    .await
                    .map_err(|e| ListenerError::new(e.to_string()))?;

                    // The scraper tree is not Send, so the snapshot is built
                    // synchronously and only the arena crosses await points
                    let document =
                        Arc::new(build_snapshot(&resource, &network.response.body.content));

                    bus.emit_awaited(Event::ParseEnd {
                        kind: lantern_core::MediaKind::Html,
                        resource,
                        payload: lantern_events::AstPayload::Html { document },
                    })
                    .await
                    .map_err(|e| ListenerError::new(e.to_string()))
                })
            },
        );
        Arc::new(HtmlParser)
    }
}
