//! URL and filesystem path conversion

use std::path::PathBuf;
use url::Url;

use crate::conversion::{ConversionContext, ConversionResult, Converter};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Converts to absolute [`Url`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlConverter;

impl Converter for UrlConverter {
    fn name(&self) -> &str {
        "url"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        *target == TypeInfo::Url
    }

    fn convert(
        &self,
        _ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let url = Url::parse(value).map_err(|e| {
            ExternalizedPropertiesError::conversion_with_source(
                format!("Invalid URL '{value}'"),
                target,
                e,
            )
        })?;
        Ok(ConversionResult::Value(PropertyValue::Url(url)))
    }
}

/// Converts to filesystem paths. The path is not required to exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathConverter;

impl Converter for PathConverter {
    fn name(&self) -> &str {
        "path"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        *target == TypeInfo::Path
    }

    fn convert(
        &self,
        _ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        if value.contains('\0') {
            return Err(ExternalizedPropertiesError::conversion(
                "Path must not contain NUL characters",
                target,
            ));
        }
        Ok(ConversionResult::Value(PropertyValue::Path(PathBuf::from(value))))
    }
}
