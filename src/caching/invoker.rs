//! Caching decorator for invokers

use std::sync::Arc;

use super::{CacheStrategy, InvocationCacheKey};
use crate::contract::{Contract, InvocationContext};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::PropertyValue;
use crate::pipeline::Invoker;

/// Shared storage of invocation results
pub type InvocationCache = Arc<dyn CacheStrategy<InvocationCacheKey, PropertyValue>>;

/// Serves invocation results from a cache, delegating to `inner` on a miss.
///
/// Only present results are cached. Failures and absent optionals are recomputed on
/// every call.
pub struct CachingInvoker<I: Invoker> {
    inner: I,
    cache: InvocationCache,
}

impl<I: Invoker> CachingInvoker<I> {
    /// Decorate `inner` with `cache`
    pub fn new(inner: I, cache: InvocationCache) -> Self {
        Self { inner, cache }
    }

    /// Decorate `inner` and prime `cache` with every eagerly loadable operation of `contract`.
    ///
    /// Operations are evaluated through `inner`, never through the returned decorator. The
    /// first failure removes everything this call cached and is reported as a configuration
    /// error.
    pub fn eager_load(inner: I, cache: InvocationCache, contract: &Contract) -> Result<Self> {
        let mut primed = Vec::new();

        for operation in contract.eager_candidates() {
            let ctx = InvocationContext::new(operation.clone());
            match inner.invoke(&ctx) {
                Ok(value) => {
                    if value.is_absent() {
                        continue;
                    }
                    let key = InvocationCacheKey::new(&ctx);
                    cache.cache(key.clone(), value);
                    primed.push(key);
                }
                Err(e) => {
                    for key in &primed {
                        cache.expire(key);
                    }
                    return Err(ExternalizedPropertiesError::configuration_with_source(
                        format!(
                            "Eager loading of contract '{}' failed at operation ({})",
                            contract.name(),
                            operation.signature()
                        ),
                        e,
                    ));
                }
            }
        }

        log::debug!(
            "Eagerly loaded {} operation(s) of contract '{}'",
            primed.len(),
            contract.name()
        );
        Ok(Self::new(inner, cache))
    }

    /// Remove the cached result of one invocation
    pub fn expire(&self, key: &InvocationCacheKey) {
        self.cache.expire(key);
    }

    /// Remove all cached results
    pub fn expire_all(&self) {
        self.cache.expire_all();
    }

    /// The underlying cache
    pub fn cache(&self) -> &InvocationCache {
        &self.cache
    }

    /// The decorated invoker
    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: Invoker> Invoker for CachingInvoker<I> {
    fn invoke(&self, ctx: &InvocationContext) -> Result<PropertyValue> {
        let key = InvocationCacheKey::new(ctx);
        if let Some(value) = self.cache.get(&key) {
            log::trace!("Cache hit for operation {}", ctx.operation().signature());
            return Ok(value);
        }

        let value = self.inner.invoke(ctx)?;
        if !value.is_absent() {
            self.cache.cache(key, value.clone());
        }
        Ok(value)
    }
}
