//! Base64 decoding processor

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

use super::Processor;
use crate::contract::InvocationContext;
use crate::error::{ExternalizedPropertiesError, Result};

/// Decodes base64 values to UTF-8 strings
#[derive(Debug, Clone)]
pub struct Base64DecodeProcessor {
    url_safe: bool,
}

impl Base64DecodeProcessor {
    /// Name operations use to select this processor
    pub const NAME: &'static str = "base64-decode";

    /// Decoder for the standard alphabet
    pub fn new() -> Self {
        Self { url_safe: false }
    }

    /// Decoder for the URL-safe alphabet
    pub fn url_safe() -> Self {
        Self { url_safe: true }
    }
}

impl Default for Base64DecodeProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for Base64DecodeProcessor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, ctx: &InvocationContext, value: &str) -> Result<String> {
        let engine = if self.url_safe { &URL_SAFE } else { &STANDARD };
        let bytes = engine.decode(value).map_err(|e| {
            ExternalizedPropertiesError::processing_with_source(
                Self::NAME,
                ctx.operation().signature(),
                "Value is not valid base64",
                e,
            )
        })?;
        String::from_utf8(bytes).map_err(|e| {
            ExternalizedPropertiesError::processing_with_source(
                Self::NAME,
                ctx.operation().signature(),
                "Decoded value is not valid UTF-8",
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OperationDescriptor;
    use crate::error::ErrorKind;
    use std::sync::Arc;

    fn ctx() -> InvocationContext {
        InvocationContext::new(Arc::new(OperationDescriptor::builder("secret").build()))
    }

    #[test]
    fn test_decode() {
        let processor = Base64DecodeProcessor::new();
        assert_eq!(processor.process(&ctx(), "aGVsbG8=").unwrap(), "hello");
    }

    #[test]
    fn test_url_safe() {
        let processor = Base64DecodeProcessor::url_safe();
        // "??>" encodes to "Pz8-" in the URL-safe alphabet
        assert_eq!(processor.process(&ctx(), "Pz8-").unwrap(), "??>");
        assert!(Base64DecodeProcessor::new().process(&ctx(), "Pz8-").is_err());
    }

    #[test]
    fn test_invalid_input() {
        let err = Base64DecodeProcessor::new()
            .process(&ctx(), "not base64!")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processing);
    }
}
