//! Boolean, character, integer and floating point conversion

use std::fmt::Display;
use std::str::FromStr;

use crate::conversion::{ConversionContext, ConversionResult, Converter};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Converts to `bool`, `char`, integers of every width and floats
///
/// Booleans follow the lenient rule: `true` in any letter case is true, anything else is
/// false. Integers are range checked against the target width.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveConverter;

fn parse<T>(value: &str, target: &TypeInfo) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        ExternalizedPropertiesError::conversion_with_source(
            format!("Invalid value '{value}'"),
            target,
            e,
        )
    })
}

fn signed<T>(value: &str, target: &TypeInfo) -> Result<PropertyValue>
where
    T: FromStr + Into<i64>,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse::<T>(value, target).map(|v| PropertyValue::Integer(v.into()))
}

fn unsigned<T>(value: &str, target: &TypeInfo) -> Result<PropertyValue>
where
    T: FromStr + Into<u64>,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse::<T>(value, target).map(|v| PropertyValue::Unsigned(v.into()))
}

fn single_char(value: &str, target: &impl Display) -> Result<PropertyValue> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(PropertyValue::Char(c)),
        _ => Err(ExternalizedPropertiesError::conversion(
            format!("Value '{value}' must be exactly one character"),
            target,
        )),
    }
}

impl Converter for PrimitiveConverter {
    fn name(&self) -> &str {
        "primitive"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        target.is_primitive()
    }

    fn convert(
        &self,
        _ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let converted = match target {
            TypeInfo::Boolean => PropertyValue::Boolean(value.eq_ignore_ascii_case("true")),
            TypeInfo::Char => single_char(value, target)?,
            TypeInfo::I8 => signed::<i8>(value, target)?,
            TypeInfo::I16 => signed::<i16>(value, target)?,
            TypeInfo::I32 => signed::<i32>(value, target)?,
            TypeInfo::I64 => signed::<i64>(value, target)?,
            TypeInfo::Isize => PropertyValue::Integer(parse::<isize>(value, target)? as i64),
            TypeInfo::U8 => unsigned::<u8>(value, target)?,
            TypeInfo::U16 => unsigned::<u16>(value, target)?,
            TypeInfo::U32 => unsigned::<u32>(value, target)?,
            TypeInfo::U64 => unsigned::<u64>(value, target)?,
            TypeInfo::Usize => PropertyValue::Unsigned(parse::<usize>(value, target)? as u64),
            TypeInfo::F32 => PropertyValue::Float(parse::<f32>(value, target)? as f64),
            TypeInfo::F64 => PropertyValue::Float(parse::<f64>(value, target)?),
            _ => return Ok(ConversionResult::Skip),
        };
        Ok(ConversionResult::Value(converted))
    }
}
