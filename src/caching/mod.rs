// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Caching strategies and the caching invoker
//!
//! All strategies share the [`CacheStrategy`] contract and are safe to use from many
//! threads at once. [`ExpiringCacheStrategy`] decorates any other strategy with a
//! per-entry lifetime. [`CachingInvoker`] puts a strategy in front of an
//! [`Invoker`](crate::pipeline::Invoker) and optionally primes it eagerly.

pub mod concurrent;
pub mod config;
pub mod expiring;
pub mod invoker;
pub mod key;
pub mod lru;
pub mod weak;

pub use concurrent::ConcurrentMapCacheStrategy;
pub use config::{CacheConfig, CacheStrategyKind};
pub use expiring::ExpiringCacheStrategy;
pub use invoker::CachingInvoker;
pub use key::InvocationCacheKey;
pub use lru::LruCacheStrategy;
pub use weak::{Reclaimable, WeakConcurrentMapCacheStrategy};

use std::sync::Arc;

/// Thread-safe cache storage
pub trait CacheStrategy<K, V>: Send + Sync {
    /// Cache a value, replacing any previous value for the key
    fn cache(&self, key: K, value: V);

    /// Get the cached value for a key
    fn get(&self, key: &K) -> Option<V>;

    /// Remove the value for a key
    fn expire(&self, key: &K);

    /// Remove all values
    fn expire_all(&self);

    /// Number of cached entries
    fn len(&self) -> usize;

    /// Check if nothing is cached
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> CacheStrategy<K, V> for Arc<S>
where
    S: CacheStrategy<K, V> + ?Sized,
{
    fn cache(&self, key: K, value: V) {
        (**self).cache(key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn expire(&self, key: &K) {
        (**self).expire(key)
    }

    fn expire_all(&self) {
        (**self).expire_all()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
