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

//! Cache configuration options

use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use super::{
    CacheStrategy, ConcurrentMapCacheStrategy, ExpiringCacheStrategy, LruCacheStrategy,
    Reclaimable, WeakConcurrentMapCacheStrategy,
};
use crate::error::{ExternalizedPropertiesError, Result};

/// Storage used for cached invocation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheStrategyKind {
    /// Unbounded concurrent map
    Concurrent,
    /// Concurrent map that drops entries of dropped contracts
    Weak,
    /// Bounded least-recently-used cache
    Lru {
        /// Maximum number of entries
        capacity: usize,
    },
}

/// Configuration for invocation caching behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether invocation results are cached
    pub enabled: bool,

    /// Storage used for cached results
    pub strategy: CacheStrategyKind,

    /// Optional lifetime of cached entries, in milliseconds when serialized
    #[serde(with = "duration_millis")]
    pub ttl: Option<Duration>,

    /// Whether eligible operations are evaluated and cached when a contract is bound
    pub eager_loading: bool,
}

impl CacheConfig {
    /// Default lifetime of cached entries
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    /// Create a new cache configuration with custom settings
    pub fn new(strategy: CacheStrategyKind, ttl: Option<Duration>, eager_loading: bool) -> Self {
        Self {
            enabled: true,
            strategy,
            ttl,
            eager_loading,
        }
    }

    /// Create a configuration with caching disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            strategy: CacheStrategyKind::Weak,
            ttl: None,
            eager_loading: false,
        }
    }

    /// Create a configuration optimized for low memory usage
    pub fn low_memory() -> Self {
        Self {
            enabled: true,
            strategy: CacheStrategyKind::Lru { capacity: 256 },
            ttl: Some(Duration::from_secs(300)),
            eager_loading: false,
        }
    }

    /// Create a configuration for testing
    pub fn testing() -> Self {
        Self {
            enabled: true,
            strategy: CacheStrategyKind::Concurrent,
            ttl: Some(Duration::from_millis(100)), // Very short TTL for tests
            eager_loading: false,
        }
    }

    /// Load a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            ExternalizedPropertiesError::configuration_with_source("Invalid cache configuration", e)
        })
    }

    /// Build the storage described by this configuration
    pub fn build_strategy<K, V>(&self) -> Result<Arc<dyn CacheStrategy<K, V>>>
    where
        K: Eq + Hash + Clone + Reclaimable + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let base: Arc<dyn CacheStrategy<K, V>> = match self.strategy {
            CacheStrategyKind::Concurrent => Arc::new(ConcurrentMapCacheStrategy::new()),
            CacheStrategyKind::Weak => Arc::new(WeakConcurrentMapCacheStrategy::new()),
            CacheStrategyKind::Lru { capacity } => Arc::new(LruCacheStrategy::new(capacity)?),
        };

        match self.ttl {
            Some(ttl) => Ok(Arc::new(ExpiringCacheStrategy::new(base, ttl)?)),
            None => Ok(base),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: CacheStrategyKind::Weak,
            ttl: Some(Self::DEFAULT_TTL),
            eager_loading: false,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
