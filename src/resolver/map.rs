//! In-memory map resolver

use indexmap::IndexMap;
use std::sync::Arc;

use super::Resolver;
use crate::contract::InvocationContext;
use crate::error::Result;

type UnresolvedCallback = Arc<dyn Fn(&str, &InvocationContext) + Send + Sync>;

/// Resolves properties from an immutable in-memory map
#[derive(Clone)]
pub struct MapResolver {
    properties: IndexMap<String, String>,
    on_unresolved: Option<UnresolvedCallback>,
}

impl MapResolver {
    /// Create a resolver over the given properties
    pub fn new<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            on_unresolved: None,
        }
    }

    /// Invoke `callback` whenever a property is not found in this map
    pub fn on_unresolved<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &InvocationContext) + Send + Sync + 'static,
    {
        self.on_unresolved = Some(Arc::new(callback));
        self
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the map holds no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Resolver for MapResolver {
    fn name(&self) -> &str {
        "map"
    }

    fn resolve(&self, ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        let value = self.properties.get(property).cloned();
        if value.is_none() {
            if let Some(callback) = &self.on_unresolved {
                callback(property, ctx);
            }
        }
        Ok(value)
    }
}
