//! Arbitrary precision decimal conversion

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::conversion::{ConversionContext, ConversionResult, Converter};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Converts to [`Decimal`], accepting plain and scientific notation
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn name(&self) -> &str {
        "decimal"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        *target == TypeInfo::Decimal
    }

    fn convert(
        &self,
        _ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let parsed = Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .map_err(|e| {
                ExternalizedPropertiesError::conversion_with_source(
                    format!("Invalid decimal value '{value}'"),
                    target,
                    e,
                )
            })?;
        Ok(ConversionResult::Value(PropertyValue::Decimal(parsed)))
    }
}
