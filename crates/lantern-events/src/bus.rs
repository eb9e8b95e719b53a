//! The event bus: subscription bookkeeping and the two dispatch modes.
//!
//! Dispatch order is part of the contract: for one emitted event, exact
//! subscriptions run before wildcard subscriptions, and each group runs in
//! registration order. Awaited dispatch runs every matching listener to
//! completion even after one fails, then surfaces the first error.

use crate::event::Event;
use crate::topic::{Topic, TopicPattern};
use futures::future::BoxFuture;
use lantern_core::LanternError;
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

/// Future returned by a listener invocation.
pub type ListenerFuture = BoxFuture<'static, Result<(), ListenerError>>;

type ListenerFn = dyn Fn(Event) -> ListenerFuture + Send + Sync;

/// An error produced by a listener.
///
/// Listeners are hint/parser callbacks; their failures carry a message and
/// surface through [`DispatchError`] on awaited dispatch.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Create a listener error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<LanternError> for ListenerError {
    fn from(err: LanternError) -> Self {
        Self::new(err.to_string())
    }
}

/// An error surfaced by awaited dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener failed; every other matching listener still ran
    #[error("listener failed for topic '{topic}': {source}")]
    Listener {
        /// Topic being dispatched when the listener failed
        topic: String,
        /// The listener's error
        source: ListenerError,
    },
}

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    pattern: TopicPattern,
    listener: Arc<ListenerFn>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct BusInner {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

/// The publish/subscribe bus one engine instance owns.
///
/// Cloning shares the underlying subscription table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<RwLock<BusInner>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for a topic pattern.
    ///
    /// Returns a handle usable with [`EventBus::off`]. Most subscribers live
    /// for the owning engine's lifetime and never unregister.
    pub fn on<F>(&self, pattern: TopicPattern, listener: F) -> SubscriptionId
    where
        F: Fn(Event) -> ListenerFuture + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().expect("acquire write lock on subscriptions");
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        debug!(pattern = %pattern, id = id.0, "registering listener");
        inner.subscriptions.push(Subscription {
            id,
            pattern,
            listener: Arc::new(listener),
        });
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.write().expect("acquire write lock on subscriptions");
        let before = inner.subscriptions.len();
        inner.subscriptions.retain(|s| s.id != id);
        inner.subscriptions.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner
            .read()
            .expect("acquire read lock on subscriptions")
            .subscriptions
            .len()
    }

    /// Matching listeners in dispatch order: exact subscriptions first, then
    /// wildcard subscriptions, each group in registration order.
    fn listeners_for(&self, topic: &Topic) -> Vec<Arc<ListenerFn>> {
        let inner = self.inner.read().expect("acquire read lock on subscriptions");

        let exact = inner
            .subscriptions
            .iter()
            .filter(|s| s.pattern.is_exact() && s.pattern.matches(topic));
        let wildcard = inner
            .subscriptions
            .iter()
            .filter(|s| !s.pattern.is_exact() && s.pattern.matches(topic));

        exact
            .chain(wildcard)
            .map(|s| Arc::clone(&s.listener))
            .collect()
    }

    /// Fire-and-forget dispatch.
    ///
    /// Returns immediately; matching listeners run in dispatch order on a
    /// spawned task and failures are logged, never propagated.
    pub fn emit(&self, event: Event) {
        let topic = event.topic();
        let listeners = self.listeners_for(&topic);
        if listeners.is_empty() {
            debug!(topic = %topic, "no listeners for emitted event");
            return;
        }

        tokio::spawn(async move {
            for listener in listeners {
                if let Err(e) = listener(event.clone()).await {
                    warn!(topic = %topic, error = %e, "listener failed during fire-and-forget dispatch");
                }
            }
        });
    }

    /// Awaited dispatch.
    ///
    /// Resolves only after every matching listener has settled. Listeners
    /// run strictly in dispatch order; a failing listener does not stop the
    /// remainder, and the first error is returned once all have been
    /// attempted.
    pub async fn emit_awaited(&self, event: Event) -> Result<(), DispatchError> {
        let topic = event.topic();
        let listeners = self.listeners_for(&topic);
        debug!(topic = %topic, count = listeners.len(), "awaited dispatch");

        let mut first_error: Option<DispatchError> = None;
        for listener in listeners {
            if let Err(source) = listener(event.clone()).await {
                warn!(topic = %topic, error = %source, "listener failed during awaited dispatch");
                if first_error.is_none() {
                    first_error = Some(DispatchError::Listener {
                        topic: topic.as_str().to_string(),
                        source,
                    });
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    fn pattern(raw: &str) -> TopicPattern {
        TopicPattern::parse(raw).expect("valid pattern")
    }

    fn scan_start() -> Event {
        Event::ScanStart {
            scan: lantern_core::ScanId::generate(),
            target: "https://example.com/".to_string(),
        }
    }

    fn recording_listener(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
    ) -> impl Fn(Event) -> ListenerFuture + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |_event| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push(name);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_awaited_dispatch_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on(pattern("scan::start"), recording_listener(&log, "first"));
        bus.on(pattern("scan::start"), recording_listener(&log, "second"));
        bus.on(pattern("scan::start"), recording_listener(&log, "third"));

        bus.emit_awaited(scan_start()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_exact_subscriptions_dispatch_before_wildcards() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        // Interleave registration so order alone cannot pass the test
        bus.on(pattern("scan::*"), recording_listener(&log, "wild-1"));
        bus.on(pattern("scan::start"), recording_listener(&log, "exact-1"));
        bus.on(pattern("*::start"), recording_listener(&log, "wild-2"));
        bus.on(pattern("scan::start"), recording_listener(&log, "exact-2"));

        bus.emit_awaited(scan_start()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["exact-1", "exact-2", "wild-1", "wild-2"]
        );
    }

    #[tokio::test]
    async fn test_non_matching_listeners_not_invoked() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on(pattern("scan::end"), recording_listener(&log, "end"));
        bus.on(pattern("fetch::**"), recording_listener(&log, "fetch"));
        bus.on(pattern("scan::start"), recording_listener(&log, "start"));

        bus.emit_awaited(scan_start()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["start"]);
    }

    #[tokio::test]
    async fn test_awaited_dispatch_waits_for_slowest_listener() {
        let bus = EventBus::new();

        for delay_ms in [10u64, 40, 25] {
            bus.on(pattern("scan::start"), move |_event| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Ok(())
                })
            });
        }

        let started = Instant::now();
        bus.emit_awaited(scan_start()).await.unwrap();
        // Listeners are serialized, so the total is at least the sum
        assert!(started.elapsed() >= Duration::from_millis(75));
    }

    #[tokio::test]
    async fn test_awaited_dispatch_all_attempted_first_error_surfaces() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on(pattern("scan::start"), recording_listener(&log, "before"));
        bus.on(pattern("scan::start"), |_event| {
            Box::pin(async { Err(ListenerError::new("first failure")) })
        });
        bus.on(pattern("scan::start"), recording_listener(&log, "after"));
        bus.on(pattern("scan::start"), |_event| {
            Box::pin(async { Err(ListenerError::new("second failure")) })
        });

        let err = bus.emit_awaited(scan_start()).await.unwrap_err();

        // Every listener ran even though two failed
        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
        let DispatchError::Listener { topic, source } = err;
        assert_eq!(topic, "scan::start");
        assert_eq!(source.to_string(), "first failure");
    }

    #[tokio::test]
    async fn test_off_removes_subscription() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let keep = bus.on(pattern("scan::start"), recording_listener(&log, "keep"));
        let drop = bus.on(pattern("scan::start"), recording_listener(&log, "drop"));

        assert!(bus.off(drop));
        assert!(!bus.off(drop)); // Already removed
        assert_eq!(bus.subscription_count(), 1);

        bus.emit_awaited(scan_start()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["keep"]);

        assert!(bus.off(keep));
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_fire_and_forget_returns_immediately_and_delivers() {
        let bus = EventBus::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        bus.on(pattern("scan::start"), move |_event| {
            let tx = tx.clone();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                tx.send("delivered").map_err(|e| ListenerError::new(e.to_string()))
            })
        });

        let started = Instant::now();
        bus.emit(scan_start());
        // emit does not wait for the sleeping listener
        assert!(started.elapsed() < Duration::from_millis(20));

        assert_eq!(rx.recv().await, Some("delivered"));
    }

    #[tokio::test]
    async fn test_fire_and_forget_swallows_listener_errors() {
        let bus = EventBus::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        bus.on(pattern("scan::start"), |_event| {
            Box::pin(async { Err(ListenerError::new("ignored")) })
        });
        bus.on(pattern("scan::start"), move |_event| {
            let tx = tx.clone();
            Box::pin(async move {
                tx.send("still ran").map_err(|e| ListenerError::new(e.to_string()))
            })
        });

        bus.emit(scan_start());
        assert_eq!(rx.recv().await, Some("still ran"));
    }

    #[tokio::test]
    async fn test_emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(scan_start());
        bus.emit_awaited(scan_start()).await.unwrap();
    }
}
