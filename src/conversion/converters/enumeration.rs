//! Enumeration conversion

use crate::conversion::{ConversionContext, ConversionResult, Converter};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Converts to enumeration variants by exact, case-sensitive name
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumConverter;

impl Converter for EnumConverter {
    fn name(&self) -> &str {
        "enum"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        matches!(target, TypeInfo::Enum { .. })
    }

    fn convert(
        &self,
        _ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let TypeInfo::Enum { name, variants } = target else {
            return Ok(ConversionResult::Skip);
        };

        if !variants.iter().any(|variant| variant == value) {
            return Err(ExternalizedPropertiesError::conversion(
                format!(
                    "'{value}' is not a variant of {name}; expected one of [{}]",
                    variants.join(", ")
                ),
                target,
            ));
        }

        Ok(ConversionResult::Value(PropertyValue::Enum {
            type_name: name.clone(),
            variant: value.to_string(),
        }))
    }
}
