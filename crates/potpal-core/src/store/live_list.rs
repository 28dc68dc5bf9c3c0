// ── Reactive snapshot mirror ──
//
// Whole-snapshot storage for one mirrored collection: the most recently
// delivered snapshot wins outright (no merging of partial updates).
// Mutations are broadcast to subscribers via `watch` channels.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::model::DocumentId;

/// Anything keyed by a store-assigned document id.
pub trait Identified {
    fn id(&self) -> &DocumentId;
}

/// A reactive mirror of a single remote collection.
///
/// [`apply`](Self::apply) replaces the entire contents with a delivered
/// snapshot, preserving delivery order and dropping duplicate ids (first
/// occurrence kept). A `DashMap` side-index gives O(1) id lookups; every
/// mutation rebuilds the snapshot subscribers receive and bumps a version
/// counter.
pub struct LiveList<T: Identified + Send + Sync + 'static> {
    /// Id index into the current snapshot.
    by_id: DashMap<DocumentId, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot in delivered order.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Identified + Send + Sync + 'static> LiveList<T> {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the contents with a freshly delivered snapshot.
    ///
    /// Order is preserved; entries repeating an earlier id are dropped so
    /// an id can appear at most once.
    pub fn apply(&self, items: Vec<T>) {
        let mut seen: HashSet<DocumentId> = HashSet::with_capacity(items.len());
        let mut ordered: Vec<Arc<T>> = Vec::with_capacity(items.len());

        for item in items {
            if seen.insert(item.id().clone()) {
                ordered.push(Arc::new(item));
            } else {
                debug!(id = %item.id(), "dropping duplicate document id in snapshot");
            }
        }

        self.by_id.clear();
        for item in &ordered {
            self.by_id.insert(item.id().clone(), Arc::clone(item));
        }

        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(ordered));
        self.version.send_modify(|v| *v += 1);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.by_id.clear();
        self.snapshot.send_modify(|snap| *snap = Arc::new(Vec::new()));
        self.version.send_modify(|v| *v += 1);
    }

    /// Look up an entry by document id.
    pub fn get(&self, id: &DocumentId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// The current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Mutation count since creation.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }
}

impl<T: Identified + Send + Sync + 'static> Default for LiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: DocumentId,
        value: &'static str,
    }

    impl Identified for Entry {
        fn id(&self) -> &DocumentId {
            &self.id
        }
    }

    fn entry(id: &str, value: &'static str) -> Entry {
        Entry {
            id: DocumentId::from(id),
            value,
        }
    }

    #[test]
    fn apply_replaces_whole_snapshot() {
        let list: LiveList<Entry> = LiveList::new();
        list.apply(vec![entry("a", "one"), entry("b", "two")]);
        assert_eq!(list.len(), 2);

        list.apply(vec![entry("c", "three")]);
        let snap = list.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].value, "three");
        assert!(list.get(&DocumentId::from("a")).is_none());
    }

    #[test]
    fn apply_preserves_delivery_order() {
        let list: LiveList<Entry> = LiveList::new();
        list.apply(vec![entry("z", "last"), entry("a", "first"), entry("m", "mid")]);

        let snap = list.snapshot();
        let ids: Vec<&str> = snap.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let list: LiveList<Entry> = LiveList::new();
        list.apply(vec![entry("a", "first"), entry("a", "second")]);

        assert_eq!(list.len(), 1);
        assert_eq!(list.get(&DocumentId::from("a")).unwrap().value, "first");
    }

    #[test]
    fn reapplying_identical_snapshot_keeps_single_entry() {
        let list: LiveList<Entry> = LiveList::new();
        list.apply(vec![entry("a", "one")]);
        list.apply(vec![entry("a", "one")]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clear_empties_index_and_snapshot() {
        let list: LiveList<Entry> = LiveList::new();
        list.apply(vec![entry("a", "one"), entry("b", "two")]);

        list.clear();
        assert!(list.is_empty());
        assert!(list.snapshot().is_empty());
        assert!(list.get(&DocumentId::from("a")).is_none());
    }

    #[test]
    fn version_bumps_on_every_mutation() {
        let list: LiveList<Entry> = LiveList::new();
        assert_eq!(list.version(), 0);
        list.apply(vec![entry("a", "one")]);
        list.clear();
        assert_eq!(list.version(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_new_snapshots() {
        let list: LiveList<Entry> = LiveList::new();
        let mut rx = list.subscribe();

        list.apply(vec![entry("a", "one")]);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
