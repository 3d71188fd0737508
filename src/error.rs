// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for externalized property resolution
//!
//! Every failure raised by the resolution pipeline is reported through the single
//! [`ExternalizedPropertiesError`] type. The specific failure is distinguishable through
//! its variant, or programmatically through [`ExternalizedPropertiesError::kind`].

use std::fmt;
use thiserror::Error;

/// Boxed error used to carry the underlying cause of a failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for externalized property operations
pub type Result<T> = std::result::Result<T, ExternalizedPropertiesError>;

/// Root error type for all externalized property operations
#[derive(Error, Debug)]
pub enum ExternalizedPropertiesError {
    /// No resolver produced a value and no fallback or absent-tolerant type applied
    #[error("Failed to resolve property '{property}' for operation ({operation}). To prevent errors when a property cannot be resolved, declare the operation's return type as optional or attach a fallback")]
    UnresolvedProperty {
        /// The expanded property name
        property: String,
        /// Signature of the operation that requested the property
        operation: String,
    },

    /// A variable inside a property name or value could not be expanded
    #[error("Variable expansion error: {message}{}", value.as_ref().map(|v| format!(" (value: '{v}')")).unwrap_or_default())]
    VariableExpansion {
        /// Human-readable error message
        message: String,
        /// The value that was being expanded
        value: Option<String>,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },

    /// No converter accepted the target type, or an accepting converter failed
    #[error("Conversion error: {message} (target type: {target_type})")]
    Conversion {
        /// Human-readable error message
        message: String,
        /// Display name of the conversion target type
        target_type: String,
        /// Underlying cause, typically the failing converter's error
        #[source]
        source: Option<BoxError>,
    },

    /// A named post-processor failed
    #[error("Processing error in processor '{processor}'{}: {message}", operation.as_ref().map(|o| format!(" for operation ({o})")).unwrap_or_default())]
    Processing {
        /// Name of the processor
        processor: String,
        /// Signature of the operation being processed
        operation: Option<String>,
        /// Human-readable error message
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },

    /// A resolver failed while looking up a property
    #[error("Resolver '{resolver}' failed to resolve property '{property}': {message}")]
    Resolution {
        /// Name of the failing resolver
        resolver: String,
        /// Property being resolved
        property: String,
        /// Human-readable error message
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },

    /// A caller-supplied fallback failed
    #[error("Fallback for operation ({operation}) failed: {message}")]
    Fallback {
        /// Signature of the operation whose fallback failed
        operation: String,
        /// Human-readable error message
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },

    /// An operation was invoked in a way its descriptor does not allow
    #[error("Invalid invocation of operation '{operation}': {message}")]
    InvalidInvocation {
        /// Name of the invoked operation
        operation: String,
        /// Human-readable error message
        message: String,
    },

    /// Invalid construction-time setup
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },
}

/// Discriminant of [`ExternalizedPropertiesError`] for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ExternalizedPropertiesError::UnresolvedProperty`]
    UnresolvedProperty,
    /// See [`ExternalizedPropertiesError::VariableExpansion`]
    VariableExpansion,
    /// See [`ExternalizedPropertiesError::Conversion`]
    Conversion,
    /// See [`ExternalizedPropertiesError::Processing`]
    Processing,
    /// See [`ExternalizedPropertiesError::Resolution`]
    Resolution,
    /// See [`ExternalizedPropertiesError::Fallback`]
    Fallback,
    /// See [`ExternalizedPropertiesError::InvalidInvocation`]
    InvalidInvocation,
    /// See [`ExternalizedPropertiesError::Configuration`]
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnresolvedProperty => "unresolved property",
            ErrorKind::VariableExpansion => "variable expansion",
            ErrorKind::Conversion => "conversion",
            ErrorKind::Processing => "processing",
            ErrorKind::Resolution => "resolution",
            ErrorKind::Fallback => "fallback",
            ErrorKind::InvalidInvocation => "invalid invocation",
            ErrorKind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

impl ExternalizedPropertiesError {
    /// Create an unresolved property error
    pub fn unresolved(property: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnresolvedProperty {
            property: property.into(),
            operation: operation.into(),
        }
    }

    /// Create a variable expansion error
    pub fn variable_expansion(message: impl Into<String>) -> Self {
        Self::VariableExpansion {
            message: message.into(),
            value: None,
            source: None,
        }
    }

    /// Create a variable expansion error for a value, keeping the underlying cause
    pub fn variable_expansion_with_source(
        message: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::VariableExpansion {
            message: message.into(),
            value: Some(value.into()),
            source: Some(source.into()),
        }
    }

    /// Create a conversion error
    pub fn conversion(message: impl Into<String>, target_type: impl fmt::Display) -> Self {
        Self::Conversion {
            message: message.into(),
            target_type: target_type.to_string(),
            source: None,
        }
    }

    /// Create a conversion error that keeps the failing converter's error as its cause
    pub fn conversion_with_source(
        message: impl Into<String>,
        target_type: impl fmt::Display,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Conversion {
            message: message.into(),
            target_type: target_type.to_string(),
            source: Some(source.into()),
        }
    }

    /// Create a processing error
    pub fn processing(processor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processing {
            processor: processor.into(),
            operation: None,
            message: message.into(),
            source: None,
        }
    }

    /// Create a processing error with operation context and cause
    pub fn processing_with_source(
        processor: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Processing {
            processor: processor.into(),
            operation: Some(operation.into()),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a resolution error
    pub fn resolution(
        resolver: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            resolver: resolver.into(),
            property: property.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a resolution error that keeps the backing source's error as its cause
    pub fn resolution_with_source(
        resolver: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Resolution {
            resolver: resolver.into(),
            property: property.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a fallback error
    pub fn fallback(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self::Fallback {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid invocation error
    pub fn invalid_invocation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInvocation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error that keeps the underlying cause
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnresolvedProperty { .. } => ErrorKind::UnresolvedProperty,
            Self::VariableExpansion { .. } => ErrorKind::VariableExpansion,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Processing { .. } => ErrorKind::Processing,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Fallback { .. } => ErrorKind::Fallback,
            Self::InvalidInvocation { .. } => ErrorKind::InvalidInvocation,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Check whether this error is of the given kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}
