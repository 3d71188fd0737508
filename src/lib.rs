//! Externalized properties for Rust
//!
//! Bind typed property contracts to pluggable configuration sources. A property name is
//! derived per call, `${...}` variables in it are expanded, the raw value is looked up
//! through an ordered resolver chain, optionally post-processed, and converted to the
//! declared target type (including nested containers). Results may be cached, and
//! eligible operations can be loaded eagerly when a contract is bound.

pub mod caching;
pub mod contract;
pub mod conversion;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod processing;
pub mod resolver;
pub mod variable_expansion;

// Re-export main types
pub use caching::{CacheConfig, CacheStrategy, CacheStrategyKind};
pub use contract::{Contract, InvocationContext, OperationDescriptor};
pub use conversion::{ConversionContext, ConversionResult, Converter, ConverterChain};
pub use error::{ErrorKind, ExternalizedPropertiesError, Result};
pub use model::{PropertyType, PropertyValue, TypeInfo};
pub use pipeline::{ContractProxy, ExternalizedProperties, ExternalizedPropertiesBuilder, Invoker};
pub use processing::{Processor, ProcessorRegistry};
pub use resolver::{Resolver, ResolverChain};
pub use variable_expansion::VariableExpander;
