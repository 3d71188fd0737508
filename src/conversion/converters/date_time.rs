//! Date and time conversion

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::conversion::{ConversionContext, ConversionResult, Converter};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Converts to dates, times and date-times.
///
/// Without a declared format, offset date-times are read as RFC 3339 and the local
/// types as ISO-8601 (`2024-01-31T10:15:30`, `2024-01-31`, `10:15:30`). A declared
/// `date_time_format` is a chrono format string and replaces the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

fn parse_default(value: &str, target: &TypeInfo) -> std::result::Result<PropertyValue, chrono::ParseError> {
    Ok(match target {
        TypeInfo::DateTime => PropertyValue::DateTime(DateTime::parse_from_rfc3339(value)?),
        TypeInfo::LocalDateTime => PropertyValue::LocalDateTime(value.parse::<NaiveDateTime>()?),
        TypeInfo::Date => PropertyValue::Date(value.parse::<NaiveDate>()?),
        _ => PropertyValue::Time(value.parse::<NaiveTime>()?),
    })
}

fn parse_with_format(
    value: &str,
    format: &str,
    target: &TypeInfo,
) -> std::result::Result<PropertyValue, chrono::ParseError> {
    Ok(match target {
        TypeInfo::DateTime => PropertyValue::DateTime(DateTime::parse_from_str(value, format)?),
        TypeInfo::LocalDateTime => {
            PropertyValue::LocalDateTime(NaiveDateTime::parse_from_str(value, format)?)
        }
        TypeInfo::Date => PropertyValue::Date(NaiveDate::parse_from_str(value, format)?),
        _ => PropertyValue::Time(NaiveTime::parse_from_str(value, format)?),
    })
}

impl Converter for DateTimeConverter {
    fn name(&self) -> &str {
        "date-time"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        matches!(
            target,
            TypeInfo::DateTime | TypeInfo::LocalDateTime | TypeInfo::Date | TypeInfo::Time
        )
    }

    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        if !self.can_convert_to(target) {
            return Ok(ConversionResult::Skip);
        }

        let format = ctx.metadata().date_time_format.as_deref();
        let parsed = match format {
            Some(format) => parse_with_format(value, format, target),
            None => parse_default(value, target),
        };

        parsed.map(ConversionResult::Value).map_err(|e| {
            let message = match format {
                Some(format) => format!("Value '{value}' does not match format '{format}'"),
                None => format!("Invalid date/time value '{value}'"),
            };
            ExternalizedPropertiesError::conversion_with_source(message, target, e)
        })
    }
}
