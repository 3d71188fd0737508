//! Unbounded concurrent map strategy

use dashmap::DashMap;
use std::hash::Hash;

use super::CacheStrategy;

/// Plain thread-safe map. Entries live until expired explicitly.
///
/// Concurrent writers of the same key race; the last write wins.
#[derive(Debug)]
pub struct ConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
}

impl<K, V> ConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> Default for ConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStrategy<K, V> for ConcurrentMapCacheStrategy<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn cache(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn expire(&self, key: &K) {
        self.entries.remove(key);
    }

    fn expire_all(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
