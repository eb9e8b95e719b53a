//! DOM traversal shared by connectors.
//!
//! After collecting an HTML target a connector walks the snapshot and emits
//! one `element::<tag>` event per element, in document order, awaiting each
//! dispatch so hint listeners finish before collection proceeds.

use lantern_core::{DomElement, DomSnapshot};
use lantern_events::{DispatchError, Event, EventBus};
use std::sync::Arc;

/// Emit an `element::<tag>` event for every element in the snapshot.
///
/// Events are awaited in document order; the first listener error stops the
/// traversal and is returned.
pub async fn emit_elements(
    bus: &EventBus,
    document: &Arc<DomSnapshot>,
) -> Result<(), DispatchError> {
    for node in document.elements() {
        bus.emit_awaited(Event::Element {
            resource: document.resource.clone(),
            element: DomElement {
                document: Arc::clone(document),
                node,
            },
        })
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::build_snapshot;
    use lantern_events::{ListenerError, TopicPattern};
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_emits_every_element_in_document_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        bus.on(
            TopicPattern::parse("element::*").expect("valid pattern"),
            move |event| {
                let log = Arc::clone(&log);
                Box::pin(async move {
                    if let Event::Element { element, .. } = event {
                        let tag = element.tag_name().unwrap_or("?").to_string();
                        log.lock().expect("acquire log lock").push(tag);
                    }
                    Ok(())
                })
            },
        );

        let document = Arc::new(build_snapshot(
            "https://example.com/",
            "<html><head></head><body><p>hi</p></body></html>",
        ));
        emit_elements(&bus, &document).await.expect("traversal");

        assert_eq!(
            *seen.lock().expect("acquire log lock"),
            vec!["html", "head", "body", "p"]
        );
    }

    #[tokio::test]
    async fn test_listener_error_stops_traversal() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&count);
        bus.on(
            TopicPattern::parse("element::*").expect("valid pattern"),
            move |_event| {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    let mut n = counter.lock().expect("acquire counter lock");
                    *n += 1;
                    if *n == 2 {
                        return Err(ListenerError::new("boom"));
                    }
                    Ok(())
                })
            },
        );

        let document = Arc::new(build_snapshot(
            "https://example.com/",
            "<html><body><p>one</p><p>two</p></body></html>",
        ));
        let err = emit_elements(&bus, &document).await;

        assert!(err.is_err());
        // html dispatched fine, head failed, body and the rest never ran
        assert_eq!(*count.lock().expect("acquire counter lock"), 2);
    }
}
