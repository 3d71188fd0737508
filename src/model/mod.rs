//! Data model for property conversion
//!
//! This module provides the target type descriptors, the dynamic value model produced by
//! converters, and the typed extraction layer on top of it.

#![warn(missing_docs)]

pub mod typed;
pub mod types;
pub mod value;

pub use typed::PropertyType;
pub use types::TypeInfo;
pub use value::{CustomValue, PropertyValue};
