//! Outcome of a call whose property could not be resolved

use crate::contract::InvocationContext;
use crate::error::{ErrorKind, ExternalizedPropertiesError, Result};
use crate::model::PropertyValue;

/// What to produce when no resolver has a value.
///
/// The decision depends only on the operation's declaration, never on resolver state. A
/// fallback always wins over an absent-tolerant return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedOutcome {
    /// Run the operation's fallback
    InvokeFallback,
    /// Return the empty optional
    EmptyOptional,
    /// Fail with an unresolved property error
    Throw,
}

impl UnresolvedOutcome {
    /// Decide the outcome for the invoked operation
    pub fn decide(ctx: &InvocationContext) -> Self {
        let operation = ctx.operation();
        if operation.has_fallback() {
            Self::InvokeFallback
        } else if operation.return_type().is_optional() || ctx.target_type().is_optional() {
            Self::EmptyOptional
        } else {
            Self::Throw
        }
    }

    /// Produce the outcome. `property` is the expanded name, if the operation has one.
    pub fn apply(self, ctx: &InvocationContext, property: Option<&str>) -> Result<PropertyValue> {
        let operation = ctx.operation();
        match self {
            Self::InvokeFallback => {
                let Some(fallback) = operation.fallback() else {
                    return Err(ExternalizedPropertiesError::invalid_invocation(
                        operation.name(),
                        "Operation has no fallback",
                    ));
                };
                log::trace!("Invoking fallback of {}", operation.signature());
                fallback(ctx).map_err(|e| {
                    if e.is(ErrorKind::Fallback) {
                        e
                    } else {
                        ExternalizedPropertiesError::fallback(
                            operation.signature(),
                            "Fallback returned an error",
                            Some(Box::new(e)),
                        )
                    }
                })
            }
            Self::EmptyOptional => Ok(PropertyValue::absent()),
            Self::Throw => match property {
                Some(property) => Err(ExternalizedPropertiesError::unresolved(
                    property,
                    operation.signature(),
                )),
                None => Err(ExternalizedPropertiesError::invalid_invocation(
                    operation.name(),
                    "Operation is not bound to a property and has no fallback",
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OperationDescriptor;
    use crate::model::TypeInfo;
    use rstest::rstest;
    use std::sync::Arc;

    fn ctx(optional: bool, fallback: bool) -> InvocationContext {
        let mut builder = OperationDescriptor::builder("timeout").returns(if optional {
            TypeInfo::optional_of(TypeInfo::I32)
        } else {
            TypeInfo::I32
        });
        if fallback {
            builder = builder.fallback(|_| Ok(PropertyValue::Integer(30)));
        }
        InvocationContext::new(Arc::new(builder.build()))
    }

    #[rstest]
    #[case(false, false, UnresolvedOutcome::Throw)]
    #[case(true, false, UnresolvedOutcome::EmptyOptional)]
    #[case(false, true, UnresolvedOutcome::InvokeFallback)]
    #[case(true, true, UnresolvedOutcome::InvokeFallback)]
    fn test_decide(
        #[case] optional: bool,
        #[case] fallback: bool,
        #[case] expected: UnresolvedOutcome,
    ) {
        assert_eq!(UnresolvedOutcome::decide(&ctx(optional, fallback)), expected);
    }

    #[test]
    fn test_fallback_beats_optional() {
        let ctx = ctx(true, true);
        let value = UnresolvedOutcome::decide(&ctx).apply(&ctx, Some("timeout")).unwrap();
        assert_eq!(value, PropertyValue::Integer(30));
    }

    #[test]
    fn test_throw_names_property_and_signature() {
        let ctx = ctx(false, false);
        let err = UnresolvedOutcome::Throw.apply(&ctx, Some("app.timeout")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedProperty);
        assert!(err.to_string().contains("'app.timeout'"));
        assert!(err.to_string().contains("timeout() -> i32"));
    }

    #[test]
    fn test_fallback_failure_wrapped() {
        let op = OperationDescriptor::builder("timeout")
            .fallback(|_| Err(ExternalizedPropertiesError::conversion("bad default", "i32")))
            .build();
        let ctx = InvocationContext::new(Arc::new(op));
        let err = UnresolvedOutcome::InvokeFallback.apply(&ctx, Some("timeout")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fallback);
        assert!(std::error::Error::source(&err).is_some());
    }
}
