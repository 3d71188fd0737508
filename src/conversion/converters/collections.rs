//! Container conversion: arrays, lists, sets and optionals
//!
//! Elements are converted by re-entering the root chain, so any element type the chain
//! supports (including other containers) works here.

use crate::conversion::{element_target, ConversionContext, ConversionResult, Converter, Tokenizer};
use crate::error::Result;
use crate::model::{PropertyValue, TypeInfo};

fn convert_elements(
    ctx: &ConversionContext<'_>,
    value: &str,
    target: &TypeInfo,
) -> Result<Vec<PropertyValue>> {
    let element = element_target(target)?;
    if value.is_empty() {
        return Ok(Vec::new());
    }

    Tokenizer::from_metadata(ctx.metadata())
        .tokenize(value)
        .into_iter()
        .map(|token| ctx.convert_element(token, element))
        .collect()
}

/// Converts delimited values to arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayConverter;

impl Converter for ArrayConverter {
    fn name(&self) -> &str {
        "array"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        matches!(target, TypeInfo::Array(_))
    }

    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        Ok(PropertyValue::Array(convert_elements(ctx, value, target)?).into())
    }
}

/// Converts delimited values to lists. Raw lists hold strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListConverter;

impl Converter for ListConverter {
    fn name(&self) -> &str {
        "list"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        matches!(target, TypeInfo::List(_))
    }

    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        Ok(PropertyValue::List(convert_elements(ctx, value, target)?).into())
    }
}

/// Converts delimited values to sets, keeping first occurrences in order
#[derive(Debug, Clone, Copy, Default)]
pub struct SetConverter;

impl Converter for SetConverter {
    fn name(&self) -> &str {
        "set"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        matches!(target, TypeInfo::Set(_))
    }

    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let distinct: indexmap::IndexSet<PropertyValue> =
            convert_elements(ctx, value, target)?.into_iter().collect();
        Ok(PropertyValue::Set(distinct.into_iter().collect()).into())
    }
}

/// Converts to optionals. An empty value is the absent optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalConverter;

impl Converter for OptionalConverter {
    fn name(&self) -> &str {
        "optional"
    }

    fn can_convert_to(&self, target: &TypeInfo) -> bool {
        target.is_optional()
    }

    fn convert(
        &self,
        ctx: &ConversionContext<'_>,
        value: &str,
        target: &TypeInfo,
    ) -> Result<ConversionResult> {
        let inner = element_target(target)?;
        if value.is_empty() {
            return Ok(PropertyValue::absent().into());
        }
        Ok(PropertyValue::present(ctx.convert_element(value, inner)?).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{InvocationContext, OperationDescriptor, OperationDescriptorBuilder};
    use crate::conversion::ConverterChain;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn convert_with(
        builder: OperationDescriptorBuilder,
        value: &str,
        target: TypeInfo,
    ) -> Result<PropertyValue> {
        let chain = ConverterChain::with_default_converters(Vec::new());
        let ctx = InvocationContext::new(Arc::new(builder.build()));
        chain.convert(&ctx, value, &target)
    }

    fn convert(value: &str, target: TypeInfo) -> Result<PropertyValue> {
        convert_with(OperationDescriptor::builder("t"), value, target)
    }

    fn ints(values: &[i64]) -> Vec<PropertyValue> {
        values.iter().map(|v| PropertyValue::Integer(*v)).collect()
    }

    #[test]
    fn test_list_of_integers() {
        assert_eq!(
            convert("1,2,3", TypeInfo::list_of(TypeInfo::I32)).unwrap(),
            PropertyValue::List(ints(&[1, 2, 3]))
        );
    }

    #[test]
    fn test_empty_value_is_empty_container() {
        assert_eq!(
            convert("", TypeInfo::list_of(TypeInfo::I32)).unwrap(),
            PropertyValue::List(Vec::new())
        );
        assert_eq!(
            convert("", TypeInfo::array_of(TypeInfo::I32)).unwrap(),
            PropertyValue::Array(Vec::new())
        );
        assert!(convert("", TypeInfo::optional_of(TypeInfo::I32)).unwrap().is_absent());
    }

    #[test]
    fn test_raw_list_holds_strings() {
        assert_eq!(
            convert("a,b", TypeInfo::List(None)).unwrap(),
            PropertyValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_nested_list_of_optionals() {
        let target = TypeInfo::list_of(TypeInfo::optional_of(TypeInfo::I32));
        assert_eq!(
            convert("1,,3", target).unwrap(),
            PropertyValue::List(vec![
                PropertyValue::present(PropertyValue::Integer(1)),
                PropertyValue::absent(),
                PropertyValue::present(PropertyValue::Integer(3)),
            ])
        );
    }

    #[test]
    fn test_custom_delimiter_and_strip() {
        let builder = OperationDescriptor::builder("t").delimiter("#").strip_empty_values();
        assert_eq!(
            convert_with(builder, "1##2#", TypeInfo::array_of(TypeInfo::I64)).unwrap(),
            PropertyValue::Array(ints(&[1, 2]))
        );
    }

    #[test]
    fn test_empty_token_without_strip_fails_for_integers() {
        let err = convert("1,,2", TypeInfo::list_of(TypeInfo::I32)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    #[test]
    fn test_set_deduplicates_in_order() {
        assert_eq!(
            convert("3,1,3,2,1", TypeInfo::set_of(TypeInfo::I32)).unwrap(),
            PropertyValue::Set(ints(&[3, 1, 2]))
        );
    }

    #[test]
    fn test_type_variable_rejected() {
        let target = TypeInfo::List(Some(Box::new(TypeInfo::TypeVariable("T".into()))));
        let err = convert("1,2", target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.to_string().contains("Type variables"));

        let optional = TypeInfo::Optional(Some(Box::new(TypeInfo::TypeVariable("T".into()))));
        assert!(convert("1", optional).is_err());
    }

    #[test]
    fn test_optional_of_list() {
        let target = TypeInfo::optional_of(TypeInfo::list_of(TypeInfo::U8));
        assert_eq!(
            convert("7,8", target).unwrap(),
            PropertyValue::present(PropertyValue::List(vec![
                PropertyValue::Unsigned(7),
                PropertyValue::Unsigned(8)
            ]))
        );
    }
}
