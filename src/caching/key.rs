//! Cache key for operation invocations

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use super::weak::Reclaimable;
use crate::contract::{Arguments, InvocationContext, OperationDescriptor, OperationId};
use crate::model::{PropertyValue, TypeInfo};

/// Identifies one invocation: the operation plus a snapshot of its arguments.
///
/// The key holds the operation weakly. Once every strong reference to the descriptor is
/// gone (its contract was dropped) the key reports itself as reclaimed.
#[derive(Clone)]
pub struct InvocationCacheKey {
    operation: OperationId,
    descriptor: Weak<OperationDescriptor>,
    arguments: Arguments,
    target_type: Option<TypeInfo>,
}

impl InvocationCacheKey {
    /// Key for the given invocation
    pub fn new(ctx: &InvocationContext) -> Self {
        let operation = ctx.operation();
        Self {
            operation: operation.id(),
            descriptor: Arc::downgrade(operation),
            arguments: ctx.arguments().iter().cloned().collect(),
            target_type: ctx.target_type_override().cloned(),
        }
    }

    /// Key for an operation called with the given arguments
    pub fn for_operation(
        operation: &Arc<OperationDescriptor>,
        arguments: impl IntoIterator<Item = PropertyValue>,
    ) -> Self {
        Self {
            operation: operation.id(),
            descriptor: Arc::downgrade(operation),
            arguments: arguments.into_iter().collect(),
            target_type: None,
        }
    }

    /// Identity of the cached operation
    pub fn operation(&self) -> OperationId {
        self.operation
    }

    /// Argument snapshot
    pub fn arguments(&self) -> &[PropertyValue] {
        &self.arguments
    }
}

impl PartialEq for InvocationCacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.operation == other.operation
            && self.arguments == other.arguments
            && self.target_type == other.target_type
    }
}

impl Eq for InvocationCacheKey {}

impl Hash for InvocationCacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operation.hash(state);
        self.arguments.hash(state);
        self.target_type.hash(state);
    }
}

impl Reclaimable for InvocationCacheKey {
    fn is_reclaimed(&self) -> bool {
        self.descriptor.strong_count() == 0
    }
}

impl fmt::Debug for InvocationCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationCacheKey")
            .field("operation", &self.operation)
            .field("arguments", &self.arguments)
            .field("target_type", &self.target_type)
            .field("reclaimed", &self.is_reclaimed())
            .finish()
    }
}
