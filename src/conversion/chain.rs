//! Root converter chain

use dashmap::DashMap;
use std::sync::Arc;

use super::converters::{DefaultConverter, OptionalConverter};
use super::{ConversionContext, ConversionResult, Converter};
use crate::contract::InvocationContext;
use crate::error::{ErrorKind, ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Ordered chain of converters
///
/// String targets are returned as is. For every other target the converters that accept
/// its raw type are tried in order until one produces a value. The accepting converters
/// are computed once per raw type and memoised.
pub struct ConverterChain {
    converters: Vec<Arc<dyn Converter>>,
    candidates: DashMap<TypeInfo, Arc<[usize]>>,
}

impl ConverterChain {
    /// Create a chain from caller converters. The optional converter is always appended.
    pub fn new(converters: impl IntoIterator<Item = Arc<dyn Converter>>) -> Self {
        let mut converters: Vec<Arc<dyn Converter>> = converters.into_iter().collect();
        converters.push(Arc::new(OptionalConverter));
        Self {
            converters,
            candidates: DashMap::new(),
        }
    }

    /// Create a chain from caller converters followed by the built-in converters
    pub fn with_default_converters(converters: impl IntoIterator<Item = Arc<dyn Converter>>) -> Self {
        let mut converters: Vec<Arc<dyn Converter>> = converters.into_iter().collect();
        converters.push(Arc::new(DefaultConverter::new()));
        Self::new(converters)
    }

    /// Converters in consultation order
    pub fn converters(&self) -> &[Arc<dyn Converter>] {
        &self.converters
    }

    /// Convert `value` to the invocation's target type
    pub fn convert_to_target(&self, invocation: &InvocationContext, value: &str) -> Result<PropertyValue> {
        self.convert(invocation, value, invocation.target_type())
    }

    /// Convert `value` to `target`
    pub fn convert(
        &self,
        invocation: &InvocationContext,
        value: &str,
        target: &TypeInfo,
    ) -> Result<PropertyValue> {
        if *target == TypeInfo::String {
            return Ok(PropertyValue::String(value.to_string()));
        }

        let ctx = ConversionContext::new(invocation, self);
        for index in self.candidates_for(target).iter() {
            let converter = &self.converters[*index];
            match converter.convert(&ctx, value, target) {
                Ok(ConversionResult::Value(converted)) => return Ok(converted),
                Ok(ConversionResult::Skip) => {
                    log::trace!("Converter '{}' skipped target {}", converter.name(), target);
                }
                Err(e) if e.is(ErrorKind::Conversion) => return Err(e),
                Err(e) => {
                    return Err(ExternalizedPropertiesError::conversion_with_source(
                        format!("Converter '{}' failed", converter.name()),
                        target,
                        e,
                    ));
                }
            }
        }

        Err(ExternalizedPropertiesError::conversion(
            "No converter available, conversion to target type not supported",
            target,
        ))
    }

    fn candidates_for(&self, target: &TypeInfo) -> Arc<[usize]> {
        let raw = target.raw();
        if let Some(found) = self.candidates.get(&raw) {
            return found.clone();
        }

        let found: Arc<[usize]> = self
            .converters
            .iter()
            .enumerate()
            .filter(|(_, converter)| converter.can_convert_to(&raw))
            .map(|(index, _)| index)
            .collect();
        self.candidates.insert(raw, found.clone());
        found
    }
}

impl std::fmt::Debug for ConverterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.converters.iter().map(|c| c.name()))
            .finish()
    }
}
