//! Environment variable resolver

use rustc_hash::FxHashMap;

use super::Resolver;
use crate::contract::InvocationContext;
use crate::error::Result;

/// Resolves properties from environment variables.
///
/// A name such as `app.http-port` is looked up as is and then as `APP_HTTP_PORT`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentResolver {
    snapshot: Option<FxHashMap<String, String>>,
}

impl EnvironmentResolver {
    /// Resolve from the live process environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve from a fixed set of variables instead of the process environment
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            snapshot: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.snapshot {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

/// `app.http-port` -> `APP_HTTP_PORT`
pub fn environment_variable_name(property: &str) -> String {
    property
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

impl Resolver for EnvironmentResolver {
    fn name(&self) -> &str {
        "environment"
    }

    fn resolve(&self, _ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        if let Some(value) = self.lookup(property) {
            return Ok(Some(value));
        }

        let converted = environment_variable_name(property);
        if converted != property {
            return Ok(self.lookup(&converted));
        }
        Ok(None)
    }
}
