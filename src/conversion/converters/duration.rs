//! Duration conversion

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::conversion::{ConversionContext, ConversionResult, Converter};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

static ISO_8601_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?(T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?)?$",
    )
    .expect("duration pattern is valid")
});

/// Converts to [`Duration`].
///
/// Values starting with `P`, `+P` or `-P` are read as ISO-8601 durations
/// (`PnDTnHnMn.nS`); anything else is a whole number of milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

fn is_iso_8601(value: &str) -> bool {
    let mut chars = value.chars().map(|c| c.to_ascii_uppercase());
    match chars.next() {
        Some('P') => true,
        Some('+' | '-') => chars.next() == Some('P'),
        _ => false,
    }
}

fn parse_iso_8601(value: &str) -> Option<Duration> {
    let captures = ISO_8601_DURATION.captures(value)?;
    let days = captures.get(2);
    let time = captures.get(3);
    let hours = captures.get(4);
    let minutes = captures.get(5);
    let seconds = captures.get(6);

    // At least one component, and a `T` must be followed by one
    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }
    if time.is_some_and(|t| t.as_str().len() == 1) {
        return None;
    }

    let number = |m: Option<regex::Match<'_>>| -> Option<i64> {
        m.map_or(Some(0), |m| m.as_str().parse::<i64>().ok())
    };

    let mut total = Duration::try_days(number(days)?)?
        .checked_add(&Duration::try_hours(number(hours)?)?)?
        .checked_add(&Duration::try_minutes(number(minutes)?)?)?
        .checked_add(&Duration::try_seconds(number(seconds)?)?)?;

    if let Some(fraction) = captures.get(7).filter(|f| !f.as_str().is_empty()) {
        let digits = fraction.as_str();
        let nanos: i64 = format!("{digits:0<9}").parse().ok()?;
        let negative = seconds.is_some_and(|s| s.as_str().starts_with('-'));
        let nanos = Duration::nanoseconds(if negative { -nanos } else { nanos });
        total = total.checked_add(&nanos)?;
    }

    if &captures[1] == "-" {
        total = -total;
    }
    Some(total)
}

impl Converter for DurationConverter {
    fn name(&self) -> &str {
        "duration"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        *target == TypeInfo::Duration
    }

    fn convert(
        &self,
        _ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let duration = if is_iso_8601(value) {
            parse_iso_8601(value).ok_or_else(|| {
                ExternalizedPropertiesError::conversion(
                    format!("Invalid ISO 8601 duration format: {value}"),
                    target,
                )
            })?
        } else {
            value
                .parse::<i64>()
                .ok()
                .and_then(Duration::try_milliseconds)
                .ok_or_else(|| {
                    ExternalizedPropertiesError::conversion(
                        format!("Value must be a number (in milliseconds): {value}"),
                        target,
                    )
                })?
        };
        Ok(ConversionResult::Value(PropertyValue::Duration(duration)))
    }
}
