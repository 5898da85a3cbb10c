// ── Generic ordered entity collection ──
//
// Lock-free concurrent storage with O(1) lookups. Readers get an immutable
// `Arc` snapshot published through a `watch` channel, so a single read
// never observes a half-applied mutation.

use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

/// Stored value plus its insertion sequence number.
struct Slot<T> {
    seq: u64,
    value: Arc<T>,
}

/// A lock-free collection for a single entity type.
///
/// Uses `DashMap` for concurrent lookups. Every mutation rebuilds the
/// snapshot in insertion order; replacing an existing key keeps its
/// original position.
pub(crate) struct EntityCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    by_key: DashMap<K, Slot<T>>,

    /// Next insertion sequence number.
    next_seq: AtomicU64,

    /// Full snapshot in insertion order, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<K, T> EntityCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: K, entity: T) -> bool {
        let value = Arc::new(entity);
        let is_new = match self.by_key.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().value = value;
                false
            }
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(Slot { seq, value });
                true
            }
        };

        self.rebuild_snapshot();
        is_new
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, slot)| slot.value);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(&r.value().value))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Return all current keys in the collection.
    pub(crate) fn keys(&self) -> Vec<K> {
        self.by_key.iter().map(|r| r.key().clone()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values in insertion order and publish them.
    ///
    /// Runs under the channel's write lock, so concurrent mutations publish
    /// one at a time and the last one out sees every completed write.
    fn rebuild_snapshot(&self) {
        self.snapshot.send_modify(|snap| {
            let mut slots: Vec<(u64, Arc<T>)> = self
                .by_key
                .iter()
                .map(|r| (r.value().seq, Arc::clone(&r.value().value)))
                .collect();
            slots.sort_unstable_by_key(|(seq, _)| *seq);
            *snap = Arc::new(slots.into_iter().map(|(_, v)| v).collect());
        });
    }
}
