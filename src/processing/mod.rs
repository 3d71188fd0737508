//! Post-processing of resolved values
//!
//! Processors transform a raw resolved string before conversion, e.g. decoding or
//! decrypting it. Which processors apply to a call is declared per operation by name.

pub mod base64;
pub mod decrypt;

pub use self::base64::Base64DecodeProcessor;
pub use decrypt::{DecryptProcessor, Decryptor};

use indexmap::IndexMap;
use std::sync::Arc;

use crate::contract::InvocationContext;
use crate::error::{ErrorKind, ExternalizedPropertiesError, Result};

/// Named transform applied to resolved values
pub trait Processor: Send + Sync {
    /// Name that operations use to select this processor
    fn name(&self) -> &str;

    /// Transform `value`
    fn process(&self, ctx: &InvocationContext, value: &str) -> Result<String>;
}

/// Registry of processors, applying an operation's declared processors in order
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: IndexMap<String, Arc<dyn Processor>>,
}

impl ProcessorRegistry {
    /// Create a registry. Processor names must be unique.
    pub fn new(processors: impl IntoIterator<Item = Arc<dyn Processor>>) -> Result<Self> {
        let mut registry = IndexMap::new();
        for processor in processors {
            let name = processor.name().to_string();
            if registry.insert(name.clone(), processor).is_some() {
                return Err(ExternalizedPropertiesError::configuration(format!(
                    "Processor '{name}' is registered more than once"
                )));
            }
        }
        Ok(Self {
            processors: registry,
        })
    }

    /// Look up a processor by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Processor>> {
        self.processors.get(name)
    }

    /// Check if a processor is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.processors.contains_key(name)
    }

    /// Registered processor names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.processors.keys().map(String::as_str)
    }

    /// Apply the invoked operation's processors to `value`
    pub fn process(&self, ctx: &InvocationContext, value: String) -> Result<String> {
        let operation = ctx.operation();
        let mut current = value;

        for name in &operation.metadata().processors {
            let processor = self.get(name).ok_or_else(|| ExternalizedPropertiesError::Processing {
                processor: name.clone(),
                operation: Some(operation.signature()),
                message: "No processor registered with this name".to_string(),
                source: None,
            })?;

            current = processor.process(ctx, &current).map_err(|e| match e {
                ExternalizedPropertiesError::Processing {
                    processor,
                    operation: None,
                    message,
                    source,
                } => ExternalizedPropertiesError::Processing {
                    processor,
                    operation: Some(operation.signature()),
                    message,
                    source,
                },
                e if e.is(ErrorKind::Processing) => e,
                e => ExternalizedPropertiesError::processing_with_source(
                    name.clone(),
                    operation.signature(),
                    "Processor failed",
                    e,
                ),
            })?;
            log::trace!("Applied processor '{}' for operation {}", name, operation.name());
        }

        Ok(current)
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.processors.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OperationDescriptor;

    struct Upper;

    impl Processor for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn process(&self, _ctx: &InvocationContext, value: &str) -> Result<String> {
            Ok(value.to_uppercase())
        }
    }

    struct Reverse;

    impl Processor for Reverse {
        fn name(&self) -> &str {
            "reverse"
        }

        fn process(&self, _ctx: &InvocationContext, value: &str) -> Result<String> {
            Ok(value.chars().rev().collect())
        }
    }

    struct Broken;

    impl Processor for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn process(&self, _ctx: &InvocationContext, _value: &str) -> Result<String> {
            Err(ExternalizedPropertiesError::configuration("key material missing"))
        }
    }

    struct Strict;

    impl Processor for Strict {
        fn name(&self) -> &str {
            "strict"
        }

        fn process(&self, _ctx: &InvocationContext, _value: &str) -> Result<String> {
            Err(ExternalizedPropertiesError::processing("strict", "Value is not canonical"))
        }
    }

    fn registry() -> ProcessorRegistry {
        ProcessorRegistry::new([
            Arc::new(Upper) as Arc<dyn Processor>,
            Arc::new(Reverse),
            Arc::new(Broken),
            Arc::new(Strict),
        ])
        .unwrap()
    }

    fn ctx(processors: &[&str]) -> InvocationContext {
        let mut builder = OperationDescriptor::builder("secret");
        for processor in processors {
            builder = builder.processor(*processor);
        }
        InvocationContext::new(Arc::new(builder.build()))
    }

    #[test]
    fn test_applied_in_declared_order() {
        let out = registry()
            .process(&ctx(&["reverse", "upper"]), "abc".to_string())
            .unwrap();
        assert_eq!(out, "CBA");
    }

    #[test]
    fn test_no_processors_is_identity() {
        assert_eq!(registry().process(&ctx(&[]), "abc".into()).unwrap(), "abc");
    }

    #[test]
    fn test_unknown_processor() {
        let err = registry().process(&ctx(&["rot13"]), "abc".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert!(err.to_string().contains("rot13"));
        assert!(err.to_string().contains("No processor registered"));
    }

    #[test]
    fn test_failure_names_processor_and_operation() {
        let err = registry().process(&ctx(&["broken"]), "abc".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processing);
        let message = err.to_string();
        assert!(message.contains("'broken'"));
        assert!(message.contains("secret() -> String"));
    }

    #[test]
    fn test_processing_error_gains_operation() {
        let err = registry().process(&ctx(&["strict"]), "abc".into()).unwrap_err();
        match err {
            ExternalizedPropertiesError::Processing {
                processor,
                operation,
                message,
                ..
            } => {
                assert_eq!(processor, "strict");
                assert_eq!(operation.as_deref(), Some("secret() -> String"));
                assert_eq!(message, "Value is not canonical");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ProcessorRegistry::new([Arc::new(Upper) as Arc<dyn Processor>, Arc::new(Upper)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
