//! Weak-keyed concurrent map strategy

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::CacheStrategy;

/// A cache key that can outlive the thing it refers to
pub trait Reclaimable {
    /// True once the referent is gone and the entry may be dropped
    fn is_reclaimed(&self) -> bool;
}

/// Concurrent map whose entries are dropped once their key is reclaimed.
///
/// A lookup that lands on a reclaimed key removes just that entry. The rest of the map is
/// swept every [`PURGE_INTERVAL`](Self::PURGE_INTERVAL) inserts, so reclaimed entries
/// linger for a while but reads never scan the whole map.
#[derive(Debug)]
pub struct WeakConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
    inserts: AtomicUsize,
}

impl<K, V> WeakConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash + Reclaimable,
{
    /// Number of inserts between two sweeps of reclaimed entries
    pub const PURGE_INTERVAL: usize = 256;

    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            inserts: AtomicUsize::new(0),
        }
    }

    /// Drop entries whose keys have been reclaimed
    pub fn purge_reclaimed(&self) {
        self.entries.retain(|key, _| !key.is_reclaimed());
    }
}

impl<K, V> Default for WeakConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash + Reclaimable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStrategy<K, V> for WeakConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash + Reclaimable + Send + Sync,
    V: Clone + Send + Sync,
{
    fn cache(&self, key: K, value: V) {
        if key.is_reclaimed() {
            return;
        }
        self.entries.insert(key, value);

        let inserts = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if inserts % Self::PURGE_INTERVAL == 0 {
            self.purge_reclaimed();
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if !entry.key().is_reclaimed() {
                return Some(entry.value().clone());
            }
        }
        // Shard read guard is released above; removal needs the write lock
        self.entries.remove_if(key, |stored, _| stored.is_reclaimed());
        None
    }

    fn expire(&self, key: &K) {
        self.entries.remove(key);
    }

    fn expire_all(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.key().is_reclaimed())
            .count()
    }
}
