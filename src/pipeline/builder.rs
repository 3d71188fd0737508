//! Entry point that assembles the pipeline and binds contracts to it

use std::sync::Arc;
use std::time::Duration;

use super::{ContractProxy, Invoker, PropertyPipeline};
use crate::caching::invoker::InvocationCache;
use crate::caching::{CacheConfig, CachingInvoker};
use crate::contract::{Contract, InvocationContext, OperationDescriptor};
use crate::conversion::{Converter, ConverterChain};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyType, PropertyValue, TypeInfo};
use crate::processing::{Processor, ProcessorRegistry};
use crate::resolver::{Resolver, ResolverChain};
use crate::variable_expansion::{SimpleVariableExpander, VariableExpander};

/// Configured pipeline plus the cache shared by every contract bound to it
pub struct ExternalizedProperties {
    pipeline: Arc<PropertyPipeline>,
    cache_config: CacheConfig,
    cache: Option<InvocationCache>,
    facade: Arc<OperationDescriptor>,
}

impl ExternalizedProperties {
    /// Start configuring an instance
    pub fn builder() -> ExternalizedPropertiesBuilder {
        ExternalizedPropertiesBuilder::new()
    }

    /// The underlying pipeline
    pub fn pipeline(&self) -> &Arc<PropertyPipeline> {
        &self.pipeline
    }

    /// Active cache configuration
    pub fn cache_config(&self) -> &CacheConfig {
        &self.cache_config
    }

    /// Cache shared by all bound contracts, if caching is enabled
    pub fn cache(&self) -> Option<&InvocationCache> {
        self.cache.as_ref()
    }

    /// Bind a contract, producing a proxy that serves its operations.
    ///
    /// Fails if an operation names a processor that is not registered, or if eager
    /// loading is enabled and any eligible operation fails.
    pub fn bind(&self, contract: Contract) -> Result<ContractProxy> {
        self.validate_processors(&contract)?;
        let contract = Arc::new(contract);

        let invoker: Arc<dyn Invoker> = match &self.cache {
            Some(cache) if self.cache_config.eager_loading => Arc::new(
                CachingInvoker::eager_load(self.pipeline.clone(), cache.clone(), &contract)?,
            ),
            Some(cache) => Arc::new(CachingInvoker::new(self.pipeline.clone(), cache.clone())),
            None => self.pipeline.clone(),
        };

        log::debug!(
            "Bound contract '{}' with {} operation(s), caching {}",
            contract.name(),
            contract.len(),
            if self.cache.is_some() { "enabled" } else { "disabled" }
        );
        Ok(ContractProxy::new(contract, invoker, self.cache.clone()))
    }

    /// Resolve a property by name, expanding variables in the name first.
    ///
    /// Processors and conversion are not applied.
    pub fn resolve_property(&self, name: &str) -> Result<Option<String>> {
        let ctx = self.facade_context(name);
        let property = self.pipeline.expand_name(&ctx, name)?;
        self.pipeline.resolve(&ctx, &property)
    }

    /// Convert a raw value to `target` through the converter chain
    pub fn convert(&self, value: &str, target: &TypeInfo) -> Result<PropertyValue> {
        let ctx = self.facade_context(value).with_target_type(target.clone());
        self.pipeline.converters().convert(&ctx, value, target)
    }

    /// Convert a raw value to a Rust type
    pub fn convert_to<T: PropertyType>(&self, value: &str) -> Result<T> {
        T::from_property_value(self.convert(value, &T::type_info())?)
    }

    /// Expand variables in `value` against the resolver chain
    pub fn expand_variables(&self, value: &str) -> Result<String> {
        self.pipeline.expand(&self.facade_context(value), value)
    }

    fn facade_context(&self, argument: &str) -> InvocationContext {
        InvocationContext::with_arguments(self.facade.clone(), [PropertyValue::from(argument)])
    }

    fn validate_processors(&self, contract: &Contract) -> Result<()> {
        let registry = self.pipeline.processors();
        for operation in contract.operations() {
            if let Some(missing) = operation
                .metadata()
                .processors
                .iter()
                .find(|name| !registry.contains(name))
            {
                return Err(ExternalizedPropertiesError::configuration(format!(
                    "Operation ({}) of contract '{}' uses processor '{}', which is not registered",
                    operation.signature(),
                    contract.name(),
                    missing
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ExternalizedProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalizedProperties")
            .field("pipeline", &self.pipeline)
            .field("cache_config", &self.cache_config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExternalizedProperties`]
///
/// Resolvers and converters are consulted by ascending ordinal. Entries with equal ordinals,
/// including everything added without one, keep the order in which they were added.
pub struct ExternalizedPropertiesBuilder {
    resolvers: Vec<(i32, Arc<dyn Resolver>)>,
    converters: Vec<(i32, Arc<dyn Converter>)>,
    default_converters: bool,
    processors: Vec<Arc<dyn Processor>>,
    expander: Option<Arc<dyn VariableExpander>>,
    cache_config: CacheConfig,
}

impl ExternalizedPropertiesBuilder {
    /// Ordinal of resolvers and converters added without one
    pub const UNORDERED: i32 = i32::MAX;

    /// Create a builder with no resolvers and caching disabled
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
            converters: Vec::new(),
            default_converters: false,
            processors: Vec::new(),
            expander: None,
            cache_config: CacheConfig::disabled(),
        }
    }

    /// Append a resolver. Resolvers are consulted in the order added.
    pub fn resolver(self, resolver: Arc<dyn Resolver>) -> Self {
        self.ordinal_resolver(Self::UNORDERED, resolver)
    }

    /// Append several resolvers
    pub fn resolvers(mut self, resolvers: impl IntoIterator<Item = Arc<dyn Resolver>>) -> Self {
        self.resolvers
            .extend(resolvers.into_iter().map(|resolver| (Self::UNORDERED, resolver)));
        self
    }

    /// Add a resolver consulted ahead of every resolver with a higher ordinal
    pub fn ordinal_resolver(mut self, ordinal: i32, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push((ordinal, resolver));
        self
    }

    /// Append a converter. Converters are consulted in the order added.
    pub fn converter(self, converter: Arc<dyn Converter>) -> Self {
        self.ordinal_converter(Self::UNORDERED, converter)
    }

    /// Append several converters
    pub fn converters(mut self, converters: impl IntoIterator<Item = Arc<dyn Converter>>) -> Self {
        self.converters
            .extend(converters.into_iter().map(|converter| (Self::UNORDERED, converter)));
        self
    }

    /// Add a converter consulted ahead of every converter with a higher ordinal.
    ///
    /// Built-in converters always come after every added converter.
    pub fn ordinal_converter(mut self, ordinal: i32, converter: Arc<dyn Converter>) -> Self {
        self.converters.push((ordinal, converter));
        self
    }

    /// Consult the built-in converters after the ones added explicitly
    pub fn with_default_converters(mut self) -> Self {
        self.default_converters = true;
        self
    }

    /// Register a processor
    pub fn processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Register several processors
    pub fn processors(mut self, processors: impl IntoIterator<Item = Arc<dyn Processor>>) -> Self {
        self.processors.extend(processors);
        self
    }

    /// Replace the default `${...}` variable expander
    pub fn variable_expander(mut self, expander: Arc<dyn VariableExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Replace the whole cache configuration
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Cache invocation results, by default for [`CacheConfig::DEFAULT_TTL`]
    pub fn enable_caching(mut self) -> Self {
        self.cache_config.enabled = true;
        self.cache_config.ttl.get_or_insert(CacheConfig::DEFAULT_TTL);
        self
    }

    /// Lifetime of cached results
    pub fn cache_duration(mut self, duration: Duration) -> Self {
        self.cache_config.ttl = Some(duration);
        self
    }

    /// Evaluate and cache eligible operations when a contract is bound. Implies caching.
    pub fn enable_eager_loading(mut self) -> Self {
        self.cache_config.eager_loading = true;
        self.enable_caching()
    }

    /// Build the instance
    pub fn build(self) -> Result<ExternalizedProperties> {
        let resolvers = ResolverChain::new(by_ordinal(self.resolvers))?;
        let converters = by_ordinal(self.converters);
        let converters = if self.default_converters {
            ConverterChain::with_default_converters(converters)
        } else {
            ConverterChain::new(converters)
        };
        let processors = ProcessorRegistry::new(self.processors)?;
        let expander = self
            .expander
            .unwrap_or_else(|| Arc::new(SimpleVariableExpander::default()));

        let cache = if self.cache_config.enabled || self.cache_config.eager_loading {
            Some(self.cache_config.build_strategy()?)
        } else {
            None
        };

        log::debug!(
            "Built externalized properties with {} resolver(s), {} converter(s), {} processor(s), cache {:?}",
            resolvers.len(),
            converters.converters().len(),
            processors.names().count(),
            self.cache_config
        );

        let facade = OperationDescriptor::builder("facade")
            .property_from_argument(0)
            .returns(TypeInfo::optional_of(TypeInfo::String))
            .build();

        Ok(ExternalizedProperties {
            pipeline: Arc::new(PropertyPipeline::new(resolvers, converters, processors, expander)),
            cache_config: self.cache_config,
            cache,
            facade: Arc::new(facade),
        })
    }
}

/// Stable sort by ordinal, dropping the ordinals
fn by_ordinal<T>(mut entries: Vec<(i32, T)>) -> Vec<T> {
    entries.sort_by_key(|(ordinal, _)| *ordinal);
    entries.into_iter().map(|(_, entry)| entry).collect()
}

impl Default for ExternalizedPropertiesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{ConversionContext, ConversionResult};
    use crate::error::ErrorKind;
    use crate::resolver::MapResolver;

    struct FixedConverter(i64);

    impl Converter for FixedConverter {
        fn can_convert_to(&self, target: &TypeInfo) -> bool {
            *target == TypeInfo::I32
        }

        fn convert(
            &self,
            _ctx: &ConversionContext<'_>,
            _value: &str,
            _target: &TypeInfo,
        ) -> Result<ConversionResult> {
            Ok(ConversionResult::Value(PropertyValue::Integer(self.0)))
        }
    }

    fn source(value: &str) -> Arc<dyn Resolver> {
        Arc::new(MapResolver::new([("key", value)]))
    }

    fn properties() -> ExternalizedProperties {
        ExternalizedProperties::builder()
            .resolver(Arc::new(MapResolver::new([
                ("env", "dev"),
                ("dev.url", "https://dev.example.com"),
                ("ports", "80,443"),
            ])))
            .with_default_converters()
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_resolver() {
        let err = ExternalizedProperties::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_caching_disabled_by_default() {
        let properties = properties();
        assert!(properties.cache().is_none());
        assert!(!properties.cache_config().enabled);
    }

    #[test]
    fn test_enable_caching_uses_default_ttl() {
        let properties = ExternalizedProperties::builder()
            .resolver(Arc::new(MapResolver::new([("a", "1")])))
            .enable_caching()
            .build()
            .unwrap();
        assert!(properties.cache().is_some());
        assert_eq!(properties.cache_config().ttl, Some(CacheConfig::DEFAULT_TTL));
    }

    #[test]
    fn test_resolve_property_facade() {
        let properties = properties();
        assert_eq!(
            properties.resolve_property("${env}.url").unwrap().as_deref(),
            Some("https://dev.example.com")
        );
        assert_eq!(properties.resolve_property("nothing").unwrap(), None);
    }

    #[test]
    fn test_convert_facade() {
        let properties = properties();
        let ports: Vec<u16> = properties.convert_to("80,443").unwrap();
        assert_eq!(ports, vec![80, 443]);
        assert_eq!(
            properties.convert("true", &TypeInfo::Boolean).unwrap(),
            PropertyValue::Boolean(true)
        );
    }

    #[test]
    fn test_expand_variables_facade() {
        let properties = properties();
        assert_eq!(properties.expand_variables("${env}-cluster").unwrap(), "dev-cluster");
        assert_eq!(
            properties.expand_variables("${region}").unwrap_err().kind(),
            ErrorKind::VariableExpansion
        );
    }

    #[test]
    fn test_bind_rejects_unknown_processor() {
        let contract = Contract::builder("Secrets")
            .operation(OperationDescriptor::builder("password").processor("decrypt"))
            .build()
            .unwrap();
        let err = properties().bind(contract).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("'decrypt'"));
    }

    #[test]
    fn test_resolvers_ordered_by_ordinal() {
        let properties = ExternalizedProperties::builder()
            .resolver(source("unordered"))
            .ordinal_resolver(5, source("five"))
            .ordinal_resolver(1, source("one"))
            .build()
            .unwrap();
        assert_eq!(properties.resolve_property("key").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_resolver_ordinal_ties_keep_registration_order() {
        let properties = ExternalizedProperties::builder()
            .ordinal_resolver(3, source("first"))
            .ordinal_resolver(3, source("second"))
            .build()
            .unwrap();
        assert_eq!(properties.resolve_property("key").unwrap().as_deref(), Some("first"));

        let properties = ExternalizedProperties::builder()
            .resolver(source("first"))
            .ordinal_resolver(ExternalizedPropertiesBuilder::UNORDERED, source("second"))
            .build()
            .unwrap();
        assert_eq!(properties.resolve_property("key").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_converters_ordered_by_ordinal() {
        let properties = ExternalizedProperties::builder()
            .resolver(source("7"))
            .converter(Arc::new(FixedConverter(1)))
            .ordinal_converter(3, Arc::new(FixedConverter(2)))
            .ordinal_converter(3, Arc::new(FixedConverter(3)))
            .with_default_converters()
            .build()
            .unwrap();
        assert_eq!(
            properties.convert("7", &TypeInfo::I32).unwrap(),
            PropertyValue::Integer(2)
        );
    }

    #[test]
    fn test_added_converters_precede_built_ins() {
        let properties = ExternalizedProperties::builder()
            .resolver(source("7"))
            .with_default_converters()
            .converter(Arc::new(FixedConverter(1)))
            .build()
            .unwrap();
        assert_eq!(
            properties.convert("7", &TypeInfo::I32).unwrap(),
            PropertyValue::Integer(1)
        );
    }
}
