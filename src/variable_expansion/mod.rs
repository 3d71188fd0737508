//! Variable expansion
//!
//! Expanders rewrite `${name}` style tokens in property names by resolving each token
//! through the same resolver chain that serves the properties themselves.

pub mod pattern;
pub mod simple;

pub use pattern::PatternVariableExpander;
pub use simple::SimpleVariableExpander;

use crate::contract::InvocationContext;
use crate::error::{ExternalizedPropertiesError, Result};
use crate::resolver::Resolver;

/// Rewrites variables inside a string
pub trait VariableExpander: Send + Sync {
    /// Expand every variable in `value`. Empty input is returned unchanged.
    fn expand_variables(
        &self,
        resolver: &dyn Resolver,
        ctx: &InvocationContext,
        value: &str,
    ) -> Result<String>;

    /// Expand an optional value; `None` stays `None`
    fn expand_optional(
        &self,
        resolver: &dyn Resolver,
        ctx: &InvocationContext,
        value: Option<&str>,
    ) -> Result<Option<String>> {
        value
            .map(|v| self.expand_variables(resolver, ctx, v))
            .transpose()
    }
}

/// Expander that leaves every value untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpVariableExpander;

impl VariableExpander for NoOpVariableExpander {
    fn expand_variables(
        &self,
        _resolver: &dyn Resolver,
        _ctx: &InvocationContext,
        value: &str,
    ) -> Result<String> {
        Ok(value.to_string())
    }
}

/// Resolve one variable or fail the whole expansion
pub(crate) fn resolve_variable(
    resolver: &dyn Resolver,
    ctx: &InvocationContext,
    variable: &str,
    value: &str,
) -> Result<String> {
    match resolver.resolve(ctx, variable) {
        Ok(Some(resolved)) => Ok(resolved),
        Ok(None) => Err(ExternalizedPropertiesError::VariableExpansion {
            message: format!(
                "Failed to expand \"{variable}\" variable. Variable value cannot be resolved from the resolver"
            ),
            value: Some(value.to_string()),
            source: None,
        }),
        Err(e) => Err(ExternalizedPropertiesError::variable_expansion_with_source(
            format!("Failed to expand \"{variable}\" variable"),
            value,
            e,
        )),
    }
}
