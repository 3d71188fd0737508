//! Built-in converters

pub mod collections;
pub mod date_time;
pub mod decimal;
pub mod duration;
pub mod enumeration;
pub mod primitive;
pub mod url_path;

pub use collections::{ArrayConverter, ListConverter, OptionalConverter, SetConverter};
pub use date_time::DateTimeConverter;
pub use decimal::DecimalConverter;
pub use duration::DurationConverter;
pub use enumeration::EnumConverter;
pub use primitive::PrimitiveConverter;
pub use url_path::{PathConverter, UrlConverter};

use std::sync::Arc;

use super::{ConversionContext, ConversionResult, Converter};
use crate::error::Result;
use crate::model::TypeInfo;

/// Bundle of every built-in converter except [`OptionalConverter`], which the chain
/// always appends on its own
pub struct DefaultConverter {
    converters: Vec<Arc<dyn Converter>>,
}

impl DefaultConverter {
    /// Create the bundle
    pub fn new() -> Self {
        Self {
            converters: vec![
                Arc::new(PrimitiveConverter),
                Arc::new(DecimalConverter),
                Arc::new(DurationConverter),
                Arc::new(DateTimeConverter),
                Arc::new(UrlConverter),
                Arc::new(PathConverter),
                Arc::new(EnumConverter),
                Arc::new(ArrayConverter),
                Arc::new(ListConverter),
                Arc::new(SetConverter),
            ],
        }
    }
}

impl Default for DefaultConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for DefaultConverter {
    fn name(&self) -> &str {
        "default"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        self.converters.iter().any(|c| c.can_convert_to(target))
    }

    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let raw = target.raw();
        for converter in self.converters.iter().filter(|c| c.can_convert_to(&raw)) {
            if let ConversionResult::Value(converted) = converter.convert(ctx, value, target)? {
                return Ok(ConversionResult::Value(converted));
            }
        }
        Ok(ConversionResult::Skip)
    }
}
