//! Resolution pipeline
//!
//! [`PropertyPipeline`] runs one call from start to finish on the calling thread:
//!
//! ```text
//! DetermineName -> ExpandName -> Resolve -> [hit]  Process -> Convert -> value
//!                                        -> [miss] UnresolvedOutcome   -> value | absent | error
//! ```
//!
//! Caching decorators implement the same [`Invoker`] contract and sit in front of the
//! pipeline. [`ExternalizedProperties`] assembles both and binds contracts to them.

pub mod builder;
pub mod default_value;
pub mod proxy;

pub use builder::{ExternalizedProperties, ExternalizedPropertiesBuilder};
pub use default_value::UnresolvedOutcome;
pub use proxy::ContractProxy;

use std::sync::Arc;

use crate::contract::InvocationContext;
use crate::conversion::ConverterChain;
use crate::error::{ErrorKind, ExternalizedPropertiesError, Result};
use crate::model::PropertyValue;
use crate::processing::ProcessorRegistry;
use crate::resolver::{Resolver, ResolverChain};
use crate::variable_expansion::VariableExpander;

/// Produces the value of one operation call
pub trait Invoker: Send + Sync {
    /// Evaluate the call described by `ctx`
    fn invoke(&self, ctx: &InvocationContext) -> Result<PropertyValue>;
}

impl<I: Invoker + ?Sized> Invoker for Arc<I> {
    fn invoke(&self, ctx: &InvocationContext) -> Result<PropertyValue> {
        (**self).invoke(ctx)
    }
}

/// The resolution-and-conversion pipeline
pub struct PropertyPipeline {
    resolvers: ResolverChain,
    converters: ConverterChain,
    processors: ProcessorRegistry,
    expander: Arc<dyn VariableExpander>,
}

impl PropertyPipeline {
    /// Assemble a pipeline from its stages
    pub fn new(
        resolvers: ResolverChain,
        converters: ConverterChain,
        processors: ProcessorRegistry,
        expander: Arc<dyn VariableExpander>,
    ) -> Self {
        Self {
            resolvers,
            converters,
            processors,
            expander,
        }
    }

    /// The resolver chain
    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    /// The converter chain
    pub fn converters(&self) -> &ConverterChain {
        &self.converters
    }

    /// The processor registry
    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    /// The variable expander
    pub fn expander(&self) -> &dyn VariableExpander {
        self.expander.as_ref()
    }

    /// Expand variables in `value` against this pipeline's resolvers
    pub fn expand(&self, ctx: &InvocationContext, value: &str) -> Result<String> {
        self.expander.expand_variables(&self.resolvers, ctx, value)
    }

    /// Expand a property name. Names that expand to nothing are rejected.
    pub fn expand_name(&self, ctx: &InvocationContext, name: &str) -> Result<String> {
        let expanded = self.expand(ctx, name)?;
        if expanded.trim().is_empty() {
            return Err(ExternalizedPropertiesError::VariableExpansion {
                message: "Property name is empty after variable expansion".to_string(),
                value: Some(name.to_string()),
                source: None,
            });
        }
        Ok(expanded)
    }

    /// Look up an already expanded property name through the resolver chain
    pub fn resolve(&self, ctx: &InvocationContext, property: &str) -> Result<Option<String>> {
        self.resolvers.resolve(ctx, property).map_err(|e| {
            if e.is(ErrorKind::Resolution) {
                e
            } else {
                ExternalizedPropertiesError::resolution_with_source(
                    self.resolvers.name(),
                    property,
                    "Resolver chain failed",
                    e,
                )
            }
        })
    }
}

impl Invoker for PropertyPipeline {
    fn invoke(&self, ctx: &InvocationContext) -> Result<PropertyValue> {
        let operation = ctx.operation();

        let Some(name) = ctx.property_name()? else {
            log::trace!("Operation {} is not bound to a property", operation.name());
            return UnresolvedOutcome::decide(ctx).apply(ctx, None);
        };

        let property = self.expand_name(ctx, &name)?;
        log::trace!("Resolving property '{}' for {}", property, operation.signature());

        let Some(raw) = self.resolve(ctx, &property)? else {
            let outcome = UnresolvedOutcome::decide(ctx);
            log::debug!(
                "Property '{}' unresolved for {}, outcome {:?}",
                property,
                operation.signature(),
                outcome
            );
            return outcome.apply(ctx, Some(&property));
        };

        let processed = self.processors.process(ctx, raw)?;
        self.converters.convert_to_target(ctx, &processed)
    }
}

impl std::fmt::Debug for PropertyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyPipeline")
            .field("resolvers", &self.resolvers)
            .field("converters", &self.converters)
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{OperationDescriptor, OperationDescriptorBuilder};
    use crate::model::TypeInfo;
    use crate::processing::{Base64DecodeProcessor, Processor};
    use crate::resolver::MapResolver;
    use crate::variable_expansion::SimpleVariableExpander;

    struct Exploding;

    impl Resolver for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn resolve(&self, _ctx: &InvocationContext, _property: &str) -> Result<Option<String>> {
            Err(ExternalizedPropertiesError::configuration("backing store offline"))
        }
    }

    fn pipeline(resolver: Arc<dyn Resolver>) -> PropertyPipeline {
        PropertyPipeline::new(
            ResolverChain::new([resolver]).unwrap(),
            ConverterChain::with_default_converters(Vec::new()),
            ProcessorRegistry::new([Arc::new(Base64DecodeProcessor::new()) as Arc<dyn Processor>])
                .unwrap(),
            Arc::new(SimpleVariableExpander::default()),
        )
    }

    fn map() -> Arc<dyn Resolver> {
        Arc::new(MapResolver::new([
            ("env", "prod"),
            ("prod.port", "8080"),
            ("secret", "aGVsbG8="),
        ]))
    }

    fn invoke(
        pipeline: &PropertyPipeline,
        builder: OperationDescriptorBuilder,
    ) -> Result<PropertyValue> {
        pipeline.invoke(&InvocationContext::new(Arc::new(builder.build())))
    }

    #[test]
    fn test_expand_resolve_convert() {
        let value = invoke(
            &pipeline(map()),
            OperationDescriptor::builder("port")
                .property("${env}.port")
                .returns(TypeInfo::U16),
        )
        .unwrap();
        assert_eq!(value, PropertyValue::Unsigned(8080));
    }

    #[test]
    fn test_processors_run_before_conversion() {
        let value = invoke(
            &pipeline(map()),
            OperationDescriptor::builder("secret").processor(Base64DecodeProcessor::NAME),
        )
        .unwrap();
        assert_eq!(value, PropertyValue::String("hello".into()));
    }

    #[test]
    fn test_unresolved_without_fallback() {
        let err = invoke(&pipeline(map()), OperationDescriptor::builder("missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedProperty);
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn test_expansion_failure_stops_before_lookup() {
        let err = invoke(
            &pipeline(map()),
            OperationDescriptor::builder("port").property("${region}.port"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VariableExpansion);
    }

    #[test]
    fn test_resolver_errors_become_resolution_errors() {
        let err = invoke(&pipeline(Arc::new(Exploding)), OperationDescriptor::builder("any"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unbound_operation_uses_fallback() {
        let value = invoke(
            &pipeline(map()),
            OperationDescriptor::builder("computed")
                .unbound()
                .fallback(|_| Ok(PropertyValue::Integer(7))),
        )
        .unwrap();
        assert_eq!(value, PropertyValue::Integer(7));
    }
}
