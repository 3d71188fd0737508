//! Invocation context

use smallvec::SmallVec;
use std::sync::Arc;

use super::operation::{OperationDescriptor, PropertyBinding};
use crate::error::{ExternalizedPropertiesError, Result};
use crate::model::{PropertyValue, TypeInfo};

/// Argument snapshot of one call
pub type Arguments = SmallVec<[PropertyValue; 2]>;

/// Immutable snapshot of one operation call
#[derive(Debug, Clone)]
pub struct InvocationContext {
    operation: Arc<OperationDescriptor>,
    arguments: Arguments,
    target_type: Option<TypeInfo>,
}

impl InvocationContext {
    /// Create a context for a call without arguments
    pub fn new(operation: Arc<OperationDescriptor>) -> Self {
        Self::with_arguments(operation, Arguments::new())
    }

    /// Create a context for a call with arguments
    pub fn with_arguments(
        operation: Arc<OperationDescriptor>,
        arguments: impl IntoIterator<Item = PropertyValue>,
    ) -> Self {
        Self {
            operation,
            arguments: arguments.into_iter().collect(),
            target_type: None,
        }
    }

    /// Override the conversion target for this call only
    pub fn with_target_type(mut self, target_type: TypeInfo) -> Self {
        self.target_type = Some(target_type);
        self
    }

    /// Per-call conversion target, if one was set
    pub fn target_type_override(&self) -> Option<&TypeInfo> {
        self.target_type.as_ref()
    }

    /// The invoked operation
    pub fn operation(&self) -> &Arc<OperationDescriptor> {
        &self.operation
    }

    /// Supplied arguments
    pub fn arguments(&self) -> &[PropertyValue] {
        &self.arguments
    }

    /// Argument at `index`
    pub fn argument(&self, index: usize) -> Option<&PropertyValue> {
        self.arguments.get(index)
    }

    /// The conversion target: call override, then metadata override, then declared type
    pub fn target_type(&self) -> &TypeInfo {
        self.target_type
            .as_ref()
            .or(self.operation.metadata().target_type.as_ref())
            .unwrap_or(self.operation.return_type())
    }

    /// Derive the (unexpanded) property name for this call.
    ///
    /// Returns `None` for operations not bound to a property.
    pub fn property_name(&self) -> Result<Option<String>> {
        let name = match self.operation.binding() {
            PropertyBinding::Template(template) => template.clone(),
            PropertyBinding::OperationName => self.operation.name().to_string(),
            PropertyBinding::FromArgument(index) => self.name_from_argument(*index)?,
            PropertyBinding::None => return Ok(None),
        };

        Ok(Some(match self.operation.prefix() {
            Some(prefix) => prefix.apply(&name),
            None => name,
        }))
    }

    fn name_from_argument(&self, index: usize) -> Result<String> {
        match self.arguments.get(index) {
            Some(PropertyValue::String(name)) if !name.trim().is_empty() => Ok(name.clone()),
            _ => Err(ExternalizedPropertiesError::invalid_invocation(
                self.operation.name(),
                format!(
                    "Please provide the property name as a non-blank string argument at position {index}"
                ),
            )),
        }
    }
}
