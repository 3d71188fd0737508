//! Prefix/suffix variable expander

use super::{VariableExpander, resolve_variable};
use crate::contract::InvocationContext;
use crate::error::{ExternalizedPropertiesError, Result};
use crate::resolver::Resolver;

/// Expands variables delimited by a literal prefix and suffix, `${` and `}` by default.
///
/// Values are scanned once from left to right. `${}` and an unterminated prefix are kept
/// verbatim. Resolved values are not scanned again.
#[derive(Debug, Clone)]
pub struct SimpleVariableExpander {
    prefix: String,
    suffix: String,
}

impl SimpleVariableExpander {
    /// Default variable prefix
    pub const DEFAULT_PREFIX: &'static str = "${";
    /// Default variable suffix
    pub const DEFAULT_SUFFIX: &'static str = "}";

    /// Create an expander with a custom prefix and suffix
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        if prefix.is_empty() || suffix.is_empty() {
            return Err(ExternalizedPropertiesError::configuration(
                "Variable prefix and suffix must not be empty",
            ));
        }
        Ok(Self { prefix, suffix })
    }
}

impl Default for SimpleVariableExpander {
    fn default() -> Self {
        Self {
            prefix: Self::DEFAULT_PREFIX.to_string(),
            suffix: Self::DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl VariableExpander for SimpleVariableExpander {
    fn expand_variables(
        &self,
        resolver: &dyn Resolver,
        ctx: &InvocationContext,
        value: &str,
    ) -> Result<String> {
        if value.is_empty() || !value.contains(self.prefix.as_str()) {
            return Ok(value.to_string());
        }

        let mut expanded = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = rest.find(self.prefix.as_str()) {
            let name_start = start + self.prefix.len();
            let Some(name_len) = rest[name_start..].find(self.suffix.as_str()) else {
                // Unterminated
                break;
            };
            let token_end = name_start + name_len + self.suffix.len();

            if name_len == 0 {
                expanded.push_str(&rest[..token_end]);
            } else {
                let variable = &rest[name_start..name_start + name_len];
                expanded.push_str(&rest[..start]);
                expanded.push_str(&resolve_variable(resolver, ctx, variable, value)?);
            }
            rest = &rest[token_end..];
        }

        expanded.push_str(rest);
        log::trace!("Expanded '{value}' to '{expanded}'");
        Ok(expanded)
    }
}
