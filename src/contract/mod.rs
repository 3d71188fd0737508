//! Declared contracts
//!
//! A [`Contract`] is the registration table that stands in for a typed interface: it maps
//! each operation name to an [`OperationDescriptor`] built once at startup. Callers route
//! calls through a [`crate::pipeline::ContractProxy`] bound to the contract.

pub mod context;
pub mod operation;

pub use context::{Arguments, InvocationContext};
pub use operation::{
    Fallback, OperationDescriptor, OperationDescriptorBuilder, OperationId, OperationMetadata,
    PropertyBinding, PropertyPrefix,
};

use indexmap::IndexMap;
use std::sync::Arc;

use crate::error::{ExternalizedPropertiesError, Result};

/// Registration table of operations
#[derive(Debug)]
pub struct Contract {
    name: String,
    prefix: Option<PropertyPrefix>,
    operations: IndexMap<String, Arc<OperationDescriptor>>,
}

impl Contract {
    /// Start building a contract
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            name: name.into(),
            prefix: None,
            operations: Vec::new(),
        }
    }

    /// Contract name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property name prefix shared by all operations
    pub fn prefix(&self) -> Option<&PropertyPrefix> {
        self.prefix.as_ref()
    }

    /// Look up an operation by name
    pub fn operation(&self, name: &str) -> Option<&Arc<OperationDescriptor>> {
        self.operations.get(name)
    }

    /// All operations in declaration order
    pub fn operations(&self) -> impl Iterator<Item = &Arc<OperationDescriptor>> {
        self.operations.values()
    }

    /// Operations that can be evaluated eagerly, in declaration order
    pub fn eager_candidates(&self) -> impl Iterator<Item = &Arc<OperationDescriptor>> {
        self.operations.values().filter(|op| op.is_eager_candidate())
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the contract declares no operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Builder for [`Contract`]
pub struct ContractBuilder {
    name: String,
    prefix: Option<PropertyPrefix>,
    operations: Vec<OperationDescriptorBuilder>,
}

impl ContractBuilder {
    /// Prefix every derived property name with `prefix.`
    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.prefix_with_delimiter(prefix, PropertyPrefix::DEFAULT_DELIMITER)
    }

    /// Prefix every derived property name with `prefix` followed by `delimiter`
    pub fn prefix_with_delimiter(
        mut self,
        prefix: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Self {
        self.prefix = Some(PropertyPrefix {
            value: prefix.into(),
            delimiter: delimiter.into(),
        });
        self
    }

    /// Register an operation
    pub fn operation(mut self, operation: OperationDescriptorBuilder) -> Self {
        self.operations.push(operation);
        self
    }

    /// Validate and build the contract
    pub fn build(self) -> Result<Contract> {
        if let Some(prefix) = &self.prefix {
            if prefix.value.trim().is_empty() {
                return Err(ExternalizedPropertiesError::configuration(format!(
                    "Contract '{}' declares a blank property prefix",
                    self.name
                )));
            }
        }

        let mut operations = IndexMap::with_capacity(self.operations.len());
        for operation in self.operations {
            validate_operation(&self.name, &operation)?;
            let name = operation.name().to_string();
            if operations.contains_key(&name) {
                return Err(ExternalizedPropertiesError::configuration(format!(
                    "Contract '{}' declares operation '{}' more than once",
                    self.name, name
                )));
            }
            let descriptor = Arc::new(operation.build_with_prefix(self.prefix.clone()));
            log::trace!(
                "Registered operation {} {} on contract '{}'",
                descriptor.id(),
                descriptor.signature(),
                self.name
            );
            operations.insert(name, descriptor);
        }

        Ok(Contract {
            name: self.name,
            prefix: self.prefix,
            operations,
        })
    }
}

fn validate_operation(contract: &str, operation: &OperationDescriptorBuilder) -> Result<()> {
    if operation.name().trim().is_empty() {
        return Err(ExternalizedPropertiesError::configuration(format!(
            "Contract '{contract}' declares an operation with a blank name"
        )));
    }

    match operation.binding() {
        PropertyBinding::Template(template) if template.trim().is_empty() => {
            Err(ExternalizedPropertiesError::configuration(format!(
                "Operation '{}' of contract '{contract}' declares a blank property name",
                operation.name()
            )))
        }
        PropertyBinding::FromArgument(index) if *index >= operation.parameter_count() => {
            Err(ExternalizedPropertiesError::configuration(format!(
                "Operation '{}' of contract '{contract}' takes its property name from argument {index} but declares only {} parameter(s)",
                operation.name(),
                operation.parameter_count()
            )))
        }
        PropertyBinding::None if !operation.has_fallback() => {
            Err(ExternalizedPropertiesError::configuration(format!(
                "Operation '{}' of contract '{contract}' is not bound to a property and has no fallback",
                operation.name()
            )))
        }
        _ => Ok(()),
    }
}
