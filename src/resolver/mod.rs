//! Property resolvers
//!
//! A [`Resolver`] answers "what is the raw value for this name?" from one backing source.
//! [`ResolverChain`] orders several resolvers; the first one that produces a value wins.

pub mod caching;
pub mod environment;
pub mod map;

pub use caching::CachingResolver;
pub use environment::EnvironmentResolver;
pub use map::MapResolver;

use indexmap::IndexMap;
use std::sync::Arc;

use crate::contract::InvocationContext;
use crate::error::{ExternalizedPropertiesError, Result};

/// A backing source of raw property values
pub trait Resolver: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Resolve a single property. `Ok(None)` means this source has no value for it.
    fn resolve(&self, ctx: &InvocationContext, property: &str) -> Result<Option<String>>;

    /// Resolve many properties at once.
    ///
    /// The result holds only the names this source could answer. The default
    /// implementation asks [`Resolver::resolve`] once per name.
    fn resolve_batch(
        &self,
        ctx: &InvocationContext,
        properties: &[String],
    ) -> Result<IndexMap<String, String>> {
        let mut resolved = IndexMap::with_capacity(properties.len());
        for property in properties {
            if let Some(value) = self.resolve(ctx, property)? {
                resolved.insert(property.clone(), value);
            }
        }
        Ok(resolved)
    }

    /// Resolvers this one is composed of, used to flatten nested chains
    fn members(&self) -> Option<&[Arc<dyn Resolver>]> {
        None
    }
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self, ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        (**self).resolve(ctx, property)
    }

    fn resolve_batch(
        &self,
        ctx: &InvocationContext,
        properties: &[String],
    ) -> Result<IndexMap<String, String>> {
        (**self).resolve_batch(ctx, properties)
    }

    fn members(&self) -> Option<&[Arc<dyn Resolver>]> {
        (**self).members()
    }
}

/// Ordered chain of resolvers, first hit wins
#[derive(Clone)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl ResolverChain {
    /// Create a chain. Nested chains are flattened.
    ///
    /// Fails with a configuration error when no resolver is given.
    pub fn new(resolvers: impl IntoIterator<Item = Arc<dyn Resolver>>) -> Result<Self> {
        let mut flattened = Vec::new();
        for resolver in resolvers {
            flatten_into(resolver, &mut flattened);
        }

        if flattened.is_empty() {
            return Err(ExternalizedPropertiesError::configuration(
                "At least one resolver is required",
            ));
        }

        Ok(Self {
            resolvers: flattened,
        })
    }

    /// Resolvers in consultation order
    pub fn resolvers(&self) -> &[Arc<dyn Resolver>] {
        &self.resolvers
    }

    /// Number of resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Always false; a chain cannot be empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

fn flatten_into(resolver: Arc<dyn Resolver>, out: &mut Vec<Arc<dyn Resolver>>) {
    match resolver.members() {
        Some(members) => {
            for member in members {
                flatten_into(member.clone(), out);
            }
        }
        None => out.push(resolver),
    }
}

impl Resolver for ResolverChain {
    fn name(&self) -> &str {
        "resolver-chain"
    }

    fn resolve(&self, ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        for resolver in &self.resolvers {
            if let Some(value) = resolver.resolve(ctx, property)? {
                log::trace!(
                    "Resolved property '{}' from resolver '{}'",
                    property,
                    resolver.name()
                );
                return Ok(Some(value));
            }
        }

        log::trace!("No resolver produced a value for property '{property}'");
        Ok(None)
    }

    fn resolve_batch(
        &self,
        ctx: &InvocationContext,
        properties: &[String],
    ) -> Result<IndexMap<String, String>> {
        let mut resolved = IndexMap::with_capacity(properties.len());
        let mut remaining: Vec<String> = properties.to_vec();

        for resolver in &self.resolvers {
            if remaining.is_empty() {
                break;
            }
            let hits = resolver.resolve_batch(ctx, &remaining)?;
            // Sources may return more than asked for; only requested names count
            for (name, value) in hits {
                if remaining.contains(&name) && !resolved.contains_key(&name) {
                    resolved.insert(name, value);
                }
            }
            remaining.retain(|name| !resolved.contains_key(name));
        }

        // Report in request order
        let mut ordered = IndexMap::with_capacity(resolved.len());
        for property in properties {
            if let Some(value) = resolved.swap_remove(property) {
                ordered.insert(property.clone(), value);
            }
        }
        Ok(ordered)
    }

    fn members(&self) -> Option<&[Arc<dyn Resolver>]> {
        Some(&self.resolvers)
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OperationDescriptor;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        name: String,
        value: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingResolver {
        fn new(name: &str, value: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                value: value.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Resolver for CountingResolver {
        fn name(&self) -> &str {
            &self.name
        }

        fn resolve(&self, _ctx: &InvocationContext, _property: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.clone())
        }
    }

    struct FailingResolver;

    impl Resolver for FailingResolver {
        fn name(&self) -> &str {
            "failing"
        }

        fn resolve(&self, _ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
            Err(ExternalizedPropertiesError::resolution(
                "failing",
                property,
                "backing source unavailable",
            ))
        }
    }

    fn ctx() -> InvocationContext {
        InvocationContext::new(Arc::new(OperationDescriptor::builder("test").build()))
    }

    #[test]
    fn test_empty_chain_rejected() {
        let err = ResolverChain::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_first_hit_wins_and_stops() {
        let first = CountingResolver::new("first", None);
        let second = CountingResolver::new("second", Some("2"));
        let third = CountingResolver::new("third", Some("3"));
        let chain = ResolverChain::new([
            first.clone() as Arc<dyn Resolver>,
            second.clone(),
            third.clone(),
        ])
        .unwrap();

        assert_eq!(chain.resolve(&ctx(), "x").unwrap().as_deref(), Some("2"));
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exhausted_chain_is_absent() {
        let chain =
            ResolverChain::new([CountingResolver::new("only", None) as Arc<dyn Resolver>]).unwrap();
        assert_eq!(chain.resolve(&ctx(), "missing").unwrap(), None);
    }

    #[test]
    fn test_errors_propagate() {
        let chain = ResolverChain::new([
            Arc::new(FailingResolver) as Arc<dyn Resolver>,
            CountingResolver::new("after", Some("x")),
        ])
        .unwrap();
        let err = chain.resolve(&ctx(), "a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[test]
    fn test_nested_chains_flattened() {
        let inner = ResolverChain::new([
            CountingResolver::new("a", None) as Arc<dyn Resolver>,
            CountingResolver::new("b", None),
        ])
        .unwrap();
        let outer = ResolverChain::new([
            Arc::new(inner) as Arc<dyn Resolver>,
            CountingResolver::new("c", None),
        ])
        .unwrap();
        let names: Vec<_> = outer.resolvers().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_batch_is_subset_and_first_hit_wins() {
        let first = Arc::new(MapResolver::new([("a", "1")]));
        let second = Arc::new(MapResolver::new([("a", "overridden"), ("b", "2")]));
        let chain = ResolverChain::new([first as Arc<dyn Resolver>, second]).unwrap();

        let requested = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        let resolved = chain.resolve_batch(&ctx(), &requested).unwrap();
        let pairs: Vec<_> = resolved.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "1")]);
    }
}
