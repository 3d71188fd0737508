//! Callable view of a bound contract

use std::sync::Arc;

use super::Invoker;
use crate::caching::InvocationCacheKey;
use crate::caching::invoker::InvocationCache;
use crate::contract::{Contract, InvocationContext, OperationDescriptor};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyType, PropertyValue};

/// Routes calls on a contract's operations into the pipeline.
///
/// Proxies are cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct ContractProxy {
    contract: Arc<Contract>,
    invoker: Arc<dyn Invoker>,
    cache: Option<InvocationCache>,
}

impl ContractProxy {
    pub(crate) fn new(
        contract: Arc<Contract>,
        invoker: Arc<dyn Invoker>,
        cache: Option<InvocationCache>,
    ) -> Self {
        Self {
            contract,
            invoker,
            cache,
        }
    }

    /// The bound contract
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Whether results are served from a cache
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Invoke an operation with arguments
    pub fn invoke(
        &self,
        operation: &str,
        arguments: impl IntoIterator<Item = PropertyValue>,
    ) -> Result<PropertyValue> {
        let descriptor = self.operation(operation)?;
        let ctx = InvocationContext::with_arguments(descriptor.clone(), arguments);
        if ctx.arguments().len() != descriptor.parameter_count() {
            return Err(ExternalizedPropertiesError::invalid_invocation(
                operation,
                format!(
                    "Expected {} argument(s) but {} were supplied",
                    descriptor.parameter_count(),
                    ctx.arguments().len()
                ),
            ));
        }
        self.invoker.invoke(&ctx)
    }

    /// Invoke an operation without arguments and extract a typed value
    pub fn get<T: PropertyType>(&self, operation: &str) -> Result<T> {
        self.get_with(operation, [])
    }

    /// Invoke an operation with arguments and extract a typed value
    pub fn get_with<T: PropertyType>(
        &self,
        operation: &str,
        arguments: impl IntoIterator<Item = PropertyValue>,
    ) -> Result<T> {
        T::from_property_value(self.invoke(operation, arguments)?)
    }

    /// Drop the cached result of one call. Does nothing when caching is disabled.
    pub fn expire(
        &self,
        operation: &str,
        arguments: impl IntoIterator<Item = PropertyValue>,
    ) -> Result<()> {
        let descriptor = self.operation(operation)?;
        if let Some(cache) = &self.cache {
            cache.expire(&InvocationCacheKey::for_operation(descriptor, arguments));
        }
        Ok(())
    }

    /// Drop every cached result of the shared cache
    pub fn expire_all(&self) {
        if let Some(cache) = &self.cache {
            cache.expire_all();
        }
    }

    fn operation(&self, name: &str) -> Result<&Arc<OperationDescriptor>> {
        self.contract.operation(name).ok_or_else(|| {
            ExternalizedPropertiesError::invalid_invocation(
                name,
                format!("Contract '{}' has no such operation", self.contract.name()),
            )
        })
    }
}

impl std::fmt::Debug for ContractProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractProxy")
            .field("contract", &self.contract.name())
            .field("caching", &self.cache.is_some())
            .finish()
    }
}
