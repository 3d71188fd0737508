//! Conversion of raw property strings to typed values
//!
//! Converters form an ordered chain. Each one either produces a value, skips to let the
//! next converter try, or fails the whole conversion. Container converters convert their
//! elements by re-entering the full chain through [`ConversionContext::convert_element`],
//! which is how nested targets such as `List<Optional<i32>>` are handled.

pub mod chain;
pub mod converters;
pub mod tokenizer;

pub use chain::ConverterChain;
pub use converters::{
    ArrayConverter, DateTimeConverter, DecimalConverter, DefaultConverter, DurationConverter,
    EnumConverter, ListConverter, OptionalConverter, PathConverter, PrimitiveConverter,
    SetConverter, UrlConverter,
};
pub use tokenizer::Tokenizer;

use crate::contract::{InvocationContext, OperationMetadata};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Outcome of a single converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    /// Converted value; ends the chain
    Value(PropertyValue),
    /// Let the next converter try
    Skip,
}

impl ConversionResult {
    /// Converted value, if any
    pub fn into_value(self) -> Option<PropertyValue> {
        match self {
            ConversionResult::Value(value) => Some(value),
            ConversionResult::Skip => None,
        }
    }
}

impl From<PropertyValue> for ConversionResult {
    fn from(value: PropertyValue) -> Self {
        ConversionResult::Value(value)
    }
}

/// Converts raw strings to one or more target types
pub trait Converter: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Quick filter on the raw target type. Returning true does not oblige
    /// [`Converter::convert`] to produce a value.
    fn can_convert_to(&self, target: &TypeInfo) -> bool;

    /// Convert `value` to `target`
    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult>;
}

/// State available to a converter during one conversion
#[derive(Clone, Copy)]
pub struct ConversionContext<'a> {
    invocation: &'a InvocationContext,
    root: &'a ConverterChain,
}

impl<'a> ConversionContext<'a> {
    pub(crate) fn new(invocation: &'a InvocationContext, root: &'a ConverterChain) -> Self {
        Self { invocation, root }
    }

    /// The invocation being served
    pub fn invocation(&self) -> &'a InvocationContext {
        self.invocation
    }

    /// Declared modifiers of the invoked operation
    pub fn metadata(&self) -> &'a OperationMetadata {
        self.invocation.operation().metadata()
    }

    /// The root chain, for converters that need to delegate
    pub fn root(&self) -> &'a ConverterChain {
        self.root
    }

    /// Convert a nested value by re-entering the full chain
    pub fn convert_element(&self, value: &str, target: &TypeInfo) -> Result<PropertyValue> {
        self.root.convert(self.invocation, value, target)
    }
}

/// Element type of a container target. Type variables are rejected.
pub(crate) fn element_target<'t>(target: &'t TypeInfo) -> Result<&'t TypeInfo> {
    match target.element_type() {
        Some(TypeInfo::TypeVariable(name)) => Err(ExternalizedPropertiesError::conversion(
            format!("Type variables are not supported as element types (found '{name}')"),
            target,
        )),
        Some(element) => Ok(element),
        None => Err(ExternalizedPropertiesError::conversion(
            "Target is not a container type",
            target,
        )),
    }
}
