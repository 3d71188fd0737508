//! Caching resolver decorator

use std::sync::Arc;

use super::Resolver;
use crate::caching::CacheStrategy;
use crate::contract::InvocationContext;
use crate::error::Result;

/// Caches the values produced by another resolver, keyed by property name.
///
/// Misses are never cached so a property that appears later in the backing source is
/// picked up on the next call.
pub struct CachingResolver<R: Resolver> {
    inner: R,
    cache: Arc<dyn CacheStrategy<String, String>>,
    name: String,
}

impl<R: Resolver> CachingResolver<R> {
    /// Decorate `inner` with `cache`
    pub fn new(inner: R, cache: Arc<dyn CacheStrategy<String, String>>) -> Self {
        let name = format!("caching({})", inner.name());
        Self { inner, cache, name }
    }

    /// Drop the cached value of one property
    pub fn expire(&self, property: &str) {
        self.cache.expire(&property.to_string());
    }

    /// Drop all cached values
    pub fn expire_all(&self) {
        self.cache.expire_all();
    }
}

impl<R: Resolver> Resolver for CachingResolver<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        let key = property.to_string();
        if let Some(value) = self.cache.get(&key) {
            return Ok(Some(value));
        }

        let resolved = self.inner.resolve(ctx, property)?;
        if let Some(value) = &resolved {
            self.cache.cache(key, value.clone());
        }
        Ok(resolved)
    }
}
