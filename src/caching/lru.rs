//! Bounded least-recently-used strategy

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;

use super::CacheStrategy;
use crate::error::{ExternalizedPropertiesError, Result};

/// Bounded cache evicting the least recently used entry when full
pub struct LruCacheStrategy<K, V>
where
    K: Eq + Hash,
{
    entries: Mutex<LruCache<K, V>>,
}

impl<K, V> LruCacheStrategy<K, V>
where
    K: Eq + Hash,
{
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            ExternalizedPropertiesError::configuration("LRU cache capacity must be greater than 0")
        })?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl<K, V> CacheStrategy<K, V> for LruCacheStrategy<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn cache(&self, key: K, value: V) {
        self.entries.lock().put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    fn expire(&self, key: &K) {
        self.entries.lock().pop(key);
    }

    fn expire_all(&self) {
        self.entries.lock().clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
