//! Shared `query_selector_all` implementation.
//!
//! Both built-in connectors keep the target document's snapshot in a lock
//! and answer selector queries against it; an invalid selector or a scan
//! that never produced an HTML target yields an empty result, not an error.

use lantern_core::{DomElement, DomSnapshot};
use lantern_parsers::SimpleSelector;
use std::sync::{Arc, RwLock};
use tracing::warn;

pub(crate) type SnapshotSlot = RwLock<Option<Arc<DomSnapshot>>>;

pub(crate) fn query_snapshot(slot: &SnapshotSlot, selector: &str) -> Vec<DomElement> {
    let guard = slot.read().expect("acquire read lock on target snapshot");
    let Some(snapshot) = guard.as_ref() else {
        return Vec::new();
    };

    let parsed = match SimpleSelector::parse(selector) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(selector, error = %e, "unsupported selector in query");
            return Vec::new();
        }
    };

    parsed
        .select(snapshot)
        .into_iter()
        .map(|node| DomElement {
            document: Arc::clone(snapshot),
            node,
        })
        .collect()
}

/// Store the snapshot of the first HTML document seen as the target
/// document. Later documents do not replace it.
pub(crate) fn store_first(slot: &SnapshotSlot, snapshot: &Arc<DomSnapshot>) {
    let mut guard = slot.write().expect("acquire write lock on target snapshot");
    if guard.is_none() {
        *guard = Some(Arc::clone(snapshot));
    }
}
