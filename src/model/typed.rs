//! Typed access to converted values
//!
//! [`PropertyType`] ties a Rust type to the [`TypeInfo`] it is converted from, so that a
//! caller can ask for `Vec<Option<i32>>` instead of matching on [`PropertyValue`].

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::path::PathBuf;
use url::Url;

use super::types::TypeInfo;
use super::value::PropertyValue;
use crate::error::{ExternalizedPropertiesError, Result};

/// A Rust type that can be produced from a converted property value
pub trait PropertyType: Sized {
    /// The conversion target describing this type
    fn type_info() -> TypeInfo;

    /// Extract this type from a converted value
    fn from_property_value(value: PropertyValue) -> Result<Self>;
}

fn mismatch<T>(value: &PropertyValue) -> ExternalizedPropertiesError {
    ExternalizedPropertiesError::conversion(
        format!(
            "Converted value of type {} cannot be read as {}",
            value.type_name(),
            std::any::type_name::<T>()
        ),
        std::any::type_name::<T>(),
    )
}

macro_rules! signed_property_type {
    ($($ty:ty => $info:ident),* $(,)?) => {
        $(
            impl PropertyType for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::$info
                }

                fn from_property_value(value: PropertyValue) -> Result<Self> {
                    let wide = match &value {
                        PropertyValue::Integer(i) => Some(*i),
                        PropertyValue::Unsigned(u) => i64::try_from(*u).ok(),
                        _ => None,
                    };
                    wide.and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| mismatch::<$ty>(&value))
                }
            }
        )*
    };
}

macro_rules! unsigned_property_type {
    ($($ty:ty => $info:ident),* $(,)?) => {
        $(
            impl PropertyType for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::$info
                }

                fn from_property_value(value: PropertyValue) -> Result<Self> {
                    let wide = match &value {
                        PropertyValue::Unsigned(u) => Some(*u),
                        PropertyValue::Integer(i) => u64::try_from(*i).ok(),
                        _ => None,
                    };
                    wide.and_then(|u| <$ty>::try_from(u).ok())
                        .ok_or_else(|| mismatch::<$ty>(&value))
                }
            }
        )*
    };
}

macro_rules! simple_property_type {
    ($($ty:ty => $info:ident / $variant:ident),* $(,)?) => {
        $(
            impl PropertyType for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::$info
                }

                fn from_property_value(value: PropertyValue) -> Result<Self> {
                    match value {
                        PropertyValue::$variant(v) => Ok(v),
                        other => Err(mismatch::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

signed_property_type!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
unsigned_property_type!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

simple_property_type!(
    String => String / String,
    bool => Boolean / Boolean,
    char => Char / Char,
    f64 => F64 / Float,
    Decimal => Decimal / Decimal,
    Duration => Duration / Duration,
    DateTime<FixedOffset> => DateTime / DateTime,
    NaiveDateTime => LocalDateTime / LocalDateTime,
    NaiveDate => Date / Date,
    NaiveTime => Time / Time,
    Url => Url / Url,
    PathBuf => Path / Path,
);

impl PropertyType for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::F32
    }

    fn from_property_value(value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Float(f) => Ok(f as f32),
            other => Err(mismatch::<f32>(&other)),
        }
    }
}

impl<T: PropertyType> PropertyType for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::list_of(T::type_info())
    }

    fn from_property_value(value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::List(items) | PropertyValue::Array(items) | PropertyValue::Set(items) => {
                items.into_iter().map(T::from_property_value).collect()
            }
            other => Err(mismatch::<Vec<T>>(&other)),
        }
    }
}

impl<T: PropertyType> PropertyType for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::optional_of(T::type_info())
    }

    fn from_property_value(value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Optional(None) => Ok(None),
            PropertyValue::Optional(Some(inner)) => T::from_property_value(*inner).map(Some),
            other => Err(mismatch::<Option<T>>(&other)),
        }
    }
}

impl PropertyType for PropertyValue {
    /// Untyped access defaults to the raw string
    fn type_info() -> TypeInfo {
        TypeInfo::String
    }

    fn from_property_value(value: PropertyValue) -> Result<Self> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_type_info_for_nested_generics() {
        assert_eq!(
            <Vec<Option<i32>>>::type_info(),
            TypeInfo::list_of(TypeInfo::optional_of(TypeInfo::I32))
        );
        assert_eq!(<Option<Url>>::type_info().to_string(), "Optional<Url>");
    }

    #[test]
    fn test_integer_width_checked() {
        assert_eq!(u8::from_property_value(PropertyValue::Integer(255)).unwrap(), 255);
        let err = u8::from_property_value(PropertyValue::Integer(256)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(u32::from_property_value(PropertyValue::Integer(-1)).is_err());
    }

    #[test]
    fn test_nested_extraction() {
        let value = PropertyValue::List(vec![
            PropertyValue::present(PropertyValue::Integer(1)),
            PropertyValue::absent(),
        ]);
        let extracted = <Vec<Option<i64>>>::from_property_value(value).unwrap();
        assert_eq!(extracted, vec![Some(1), None]);
    }

    #[test]
    fn test_mismatch_is_conversion_error() {
        let err = bool::from_property_value(PropertyValue::from("true")).unwrap_err();
        assert!(err.is(ErrorKind::Conversion));
    }
}
