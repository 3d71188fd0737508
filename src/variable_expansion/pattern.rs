//! Regex based variable expander

use once_cell::sync::Lazy;
use regex::Regex;

use super::{VariableExpander, resolve_variable};
use crate::contract::InvocationContext;
use crate::error::{ExternalizedPropertiesError, Result};
use crate::resolver::Resolver;

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(PatternVariableExpander::DEFAULT_PATTERN).expect("default variable pattern is valid")
});

/// Expands variables matched by a regular expression.
///
/// The first capture group of each match is the variable name.
#[derive(Debug, Clone)]
pub struct PatternVariableExpander {
    pattern: Regex,
}

impl PatternVariableExpander {
    /// Default variable pattern, equivalent to `${name}`
    pub const DEFAULT_PATTERN: &'static str = r"\$\{([^}]+)\}";

    /// Create an expander from a pattern with at least one capture group
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            ExternalizedPropertiesError::configuration_with_source(
                format!("Invalid variable pattern '{pattern}'"),
                e,
            )
        })?;
        Self::from_regex(pattern)
    }

    /// Create an expander from a compiled pattern
    pub fn from_regex(pattern: Regex) -> Result<Self> {
        // captures_len counts the implicit whole-match group
        if pattern.captures_len() < 2 {
            return Err(ExternalizedPropertiesError::configuration(format!(
                "Variable pattern '{}' must have a capture group for the variable name",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern })
    }
}

impl Default for PatternVariableExpander {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl VariableExpander for PatternVariableExpander {
    fn expand_variables(
        &self,
        resolver: &dyn Resolver,
        ctx: &InvocationContext,
        value: &str,
    ) -> Result<String> {
        if value.is_empty() {
            return Ok(String::new());
        }

        let mut expanded = String::with_capacity(value.len());
        let mut last = 0;

        for captures in self.pattern.captures_iter(value) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            expanded.push_str(&value[last..whole.start()]);
            expanded.push_str(&resolve_variable(resolver, ctx, name.as_str(), value)?);
            last = whole.end();
        }

        expanded.push_str(&value[last..]);
        Ok(expanded)
    }
}
