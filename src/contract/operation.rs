//! Operation descriptors
//!
//! An [`OperationDescriptor`] is the resolved metadata of one operation in a declared
//! contract: where its property name comes from, what it converts to, which processors
//! apply and which fallback runs when nothing resolves.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::InvocationContext;
use crate::error::Result;
use crate::model::{PropertyType, PropertyValue, TypeInfo};

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a registered operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl OperationId {
    fn next() -> Self {
        Self(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Caller-supplied computation used when a property cannot be resolved
pub type Fallback = Arc<dyn Fn(&InvocationContext) -> Result<PropertyValue> + Send + Sync>;

/// Where an operation's property name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyBinding {
    /// Static name template, may contain variables
    Template(String),
    /// The operation's own name
    OperationName,
    /// Taken from the string argument at the given position
    FromArgument(usize),
    /// Not bound to a property; the fallback always runs
    None,
}

impl PropertyBinding {
    /// Check if this binding names a property
    pub fn is_property(&self) -> bool {
        !matches!(self, PropertyBinding::None)
    }
}

/// Contract-level property name prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPrefix {
    /// Prefix value
    pub value: String,
    /// Delimiter placed between prefix and name
    pub delimiter: String,
}

impl PropertyPrefix {
    /// Default prefix delimiter
    pub const DEFAULT_DELIMITER: &'static str = ".";

    /// Apply this prefix to a property name
    pub fn apply(&self, name: &str) -> String {
        format!("{}{}{}", self.value, self.delimiter, name)
    }
}

/// Declared per-operation modifiers consumed by converters and processors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMetadata {
    /// Processor names applied to resolved values, in order
    pub processors: Vec<String>,
    /// Delimiter used by container converters (default `,`)
    pub delimiter: Option<String>,
    /// Drop empty tokens when splitting container values
    pub strip_empty_values: bool,
    /// chrono format string used by the date/time converter
    pub date_time_format: Option<String>,
    /// Conversion target overriding the declared return type
    pub target_type: Option<TypeInfo>,
    /// Free-form attributes for caller converters and processors
    pub attributes: IndexMap<String, String>,
}

/// Resolved metadata of one contract operation
pub struct OperationDescriptor {
    id: OperationId,
    name: String,
    binding: PropertyBinding,
    return_type: TypeInfo,
    parameter_count: usize,
    metadata: OperationMetadata,
    fallback: Option<Fallback>,
    prefix: Option<PropertyPrefix>,
}

impl OperationDescriptor {
    /// Start building a descriptor for the named operation
    pub fn builder(name: impl Into<String>) -> OperationDescriptorBuilder {
        OperationDescriptorBuilder::new(name)
    }

    /// Operation identity
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property binding
    pub fn binding(&self) -> &PropertyBinding {
        &self.binding
    }

    /// Declared return type
    pub fn return_type(&self) -> &TypeInfo {
        &self.return_type
    }

    /// Number of declared parameters
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Declared modifiers
    pub fn metadata(&self) -> &OperationMetadata {
        &self.metadata
    }

    /// Fallback computation, if any
    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    /// Check if the operation has a fallback computation
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Contract prefix applied to derived property names
    pub fn prefix(&self) -> Option<&PropertyPrefix> {
        self.prefix.as_ref()
    }

    /// Check if the operation can be evaluated eagerly
    pub fn is_eager_candidate(&self) -> bool {
        self.parameter_count == 0 && (self.binding.is_property() || self.fallback.is_some())
    }

    /// Human-readable signature used in diagnostics, e.g. `timeout() -> Duration`
    pub fn signature(&self) -> String {
        let params = (0..self.parameter_count)
            .map(|i| format!("arg{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}) -> {}", self.name, params, self.return_type)
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("binding", &self.binding)
            .field("return_type", &self.return_type)
            .field("parameter_count", &self.parameter_count)
            .field("metadata", &self.metadata)
            .field("has_fallback", &self.fallback.is_some())
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Builder for [`OperationDescriptor`]
pub struct OperationDescriptorBuilder {
    name: String,
    binding: PropertyBinding,
    return_type: TypeInfo,
    parameter_count: usize,
    metadata: OperationMetadata,
    fallback: Option<Fallback>,
}

impl OperationDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: PropertyBinding::OperationName,
            return_type: TypeInfo::String,
            parameter_count: 0,
            metadata: OperationMetadata::default(),
            fallback: None,
        }
    }

    /// Bind to a static property name template
    pub fn property(mut self, template: impl Into<String>) -> Self {
        self.binding = PropertyBinding::Template(template.into());
        self
    }

    /// Take the property name from the string argument at `index`
    pub fn property_from_argument(mut self, index: usize) -> Self {
        self.binding = PropertyBinding::FromArgument(index);
        self.parameter_count = self.parameter_count.max(index + 1);
        self
    }

    /// Do not bind to any property; the fallback computes every result
    pub fn unbound(mut self) -> Self {
        self.binding = PropertyBinding::None;
        self
    }

    /// Declared return type
    pub fn returns(mut self, return_type: TypeInfo) -> Self {
        self.return_type = return_type;
        self
    }

    /// Declared return type taken from a Rust type
    pub fn returns_type<T: PropertyType>(self) -> Self {
        self.returns(T::type_info())
    }

    /// Number of declared parameters
    pub fn parameters(mut self, count: usize) -> Self {
        self.parameter_count = count;
        self
    }

    /// Append a processor to apply to resolved values
    pub fn processor(mut self, name: impl Into<String>) -> Self {
        self.metadata.processors.push(name.into());
        self
    }

    /// Delimiter used when converting to containers
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.metadata.delimiter = Some(delimiter.into());
        self
    }

    /// Drop empty tokens when converting to containers
    pub fn strip_empty_values(mut self) -> Self {
        self.metadata.strip_empty_values = true;
        self
    }

    /// chrono format string for date/time targets
    pub fn date_time_format(mut self, format: impl Into<String>) -> Self {
        self.metadata.date_time_format = Some(format.into());
        self
    }

    /// Convert to `target` instead of the declared return type
    pub fn target_type(mut self, target: TypeInfo) -> Self {
        self.metadata.target_type = Some(target);
        self
    }

    /// Attach a free-form attribute
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.attributes.insert(key.into(), value.into());
        self
    }

    /// Fallback computation used when the property cannot be resolved
    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&InvocationContext) -> Result<PropertyValue> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Name of the operation being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a standalone descriptor
    pub fn build(self) -> OperationDescriptor {
        self.build_with_prefix(None)
    }

    pub(crate) fn build_with_prefix(self, prefix: Option<PropertyPrefix>) -> OperationDescriptor {
        OperationDescriptor {
            id: OperationId::next(),
            name: self.name,
            binding: self.binding,
            return_type: self.return_type,
            parameter_count: self.parameter_count,
            metadata: self.metadata,
            fallback: self.fallback,
            prefix,
        }
    }

    pub(crate) fn binding(&self) -> &PropertyBinding {
        &self.binding
    }

    pub(crate) fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub(crate) fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
