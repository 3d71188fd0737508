//! Core value type produced by conversion

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use super::types::TypeInfo;

/// Converted property value
///
/// Values mirror the shape of the [`TypeInfo`] they were converted to. Integers of all
/// widths are carried as `Integer`/`Unsigned`; width checks happen during conversion.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// String value
    String(String),

    /// Boolean value
    Boolean(bool),

    /// Single character
    Char(char),

    /// Signed integer value
    Integer(i64),

    /// Unsigned integer value
    Unsigned(u64),

    /// Floating point value
    Float(f64),

    /// Decimal value with arbitrary precision
    Decimal(Decimal),

    /// Signed duration
    Duration(Duration),

    /// DateTime with offset
    DateTime(DateTime<FixedOffset>),

    /// DateTime without offset
    LocalDateTime(NaiveDateTime),

    /// Date value (without time)
    Date(NaiveDate),

    /// Time value (without date)
    Time(NaiveTime),

    /// Absolute URL
    Url(Url),

    /// Filesystem path
    Path(PathBuf),

    /// Enumeration variant
    Enum {
        /// Enum type name
        type_name: String,
        /// Variant name
        variant: String,
    },

    /// Array of values
    Array(Vec<PropertyValue>),

    /// Ordered list of values
    List(Vec<PropertyValue>),

    /// Insertion-ordered set of distinct values
    Set(Vec<PropertyValue>),

    /// Optional value; `None` is the absent value
    Optional(Option<Box<PropertyValue>>),

    /// Value produced by a caller-registered converter
    Custom(CustomValue),
}

/// Opaque value produced by a caller-registered converter
#[derive(Clone)]
pub struct CustomValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    /// Wrap an arbitrary value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Rust type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the wrapped value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.value) as *const ()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({})", self.type_name)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for CustomValue {}

impl Hash for CustomValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl PropertyValue {
    /// The absent optional value
    pub fn absent() -> Self {
        Self::Optional(None)
    }

    /// A present optional value
    pub fn present(value: PropertyValue) -> Self {
        Self::Optional(Some(Box::new(value)))
    }

    /// Wrap a caller-defined value
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(CustomValue::new(value))
    }

    /// Check if this is the absent optional value
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Optional(None))
    }

    /// Get the type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Boolean(_) => "Boolean",
            Self::Char(_) => "Char",
            Self::Integer(_) => "Integer",
            Self::Unsigned(_) => "Unsigned",
            Self::Float(_) => "Float",
            Self::Decimal(_) => "Decimal",
            Self::Duration(_) => "Duration",
            Self::DateTime(_) => "DateTime",
            Self::LocalDateTime(_) => "LocalDateTime",
            Self::Date(_) => "Date",
            Self::Time(_) => "Time",
            Self::Url(_) => "Url",
            Self::Path(_) => "Path",
            Self::Enum { .. } => "Enum",
            Self::Array(_) => "Array",
            Self::List(_) => "List",
            Self::Set(_) => "Set",
            Self::Optional(_) => "Optional",
            Self::Custom(_) => "Custom",
        }
    }

    /// Borrow as a string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a signed integer if this is an integer that fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Unsigned(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Get as a boolean if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the elements if this is an array, list or set
    pub fn as_slice(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Array(items) | Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Check whether this value has the shape described by `type_info`
    pub fn conforms_to(&self, type_info: &TypeInfo) -> bool {
        match (self, type_info) {
            (Self::String(_), TypeInfo::String) => true,
            (Self::Boolean(_), TypeInfo::Boolean) => true,
            (Self::Char(_), TypeInfo::Char) => true,
            (Self::Integer(_), t) | (Self::Unsigned(_), t) if t.is_integer() => true,
            (Self::Float(_), TypeInfo::F32 | TypeInfo::F64) => true,
            (Self::Decimal(_), TypeInfo::Decimal) => true,
            (Self::Duration(_), TypeInfo::Duration) => true,
            (Self::DateTime(_), TypeInfo::DateTime) => true,
            (Self::LocalDateTime(_), TypeInfo::LocalDateTime) => true,
            (Self::Date(_), TypeInfo::Date) => true,
            (Self::Time(_), TypeInfo::Time) => true,
            (Self::Url(_), TypeInfo::Url) => true,
            (Self::Path(_), TypeInfo::Path) => true,
            (Self::Enum { type_name, .. }, TypeInfo::Enum { name, .. }) => type_name == name,
            (Self::Array(items), TypeInfo::Array(_))
            | (Self::List(items), TypeInfo::List(_))
            | (Self::Set(items), TypeInfo::Set(_)) => match type_info.element_type() {
                Some(elem) => items.iter().all(|item| item.conforms_to(elem)),
                None => true,
            },
            (Self::Optional(inner), TypeInfo::Optional(_)) => match (inner, type_info.element_type()) {
                (Some(value), Some(elem)) => value.conforms_to(elem),
                _ => true,
            },
            (Self::Custom(_), TypeInfo::Named(_)) => true,
            _ => false,
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Unsigned(a), Self::Unsigned(b)) => a == b,
            // Bitwise so that Eq and Hash stay consistent (NaN == NaN)
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::LocalDateTime(a), Self::LocalDateTime(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Url(a), Self::Url(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (
                Self::Enum {
                    type_name: t1,
                    variant: v1,
                },
                Self::Enum {
                    type_name: t2,
                    variant: v2,
                },
            ) => t1 == t2 && v1 == v2,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Optional(a), Self::Optional(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PropertyValue {}

impl Hash for PropertyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::String(s) => s.hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::Char(c) => c.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Unsigned(u) => u.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Decimal(d) => d.hash(state),
            Self::Duration(d) => d.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::LocalDateTime(dt) => dt.hash(state),
            Self::Date(d) => d.hash(state),
            Self::Time(t) => t.hash(state),
            Self::Url(u) => u.hash(state),
            Self::Path(p) => p.hash(state),
            Self::Enum { type_name, variant } => {
                type_name.hash(state);
                variant.hash(state);
            }
            Self::Array(items) | Self::List(items) | Self::Set(items) => items.hash(state),
            Self::Optional(inner) => inner.hash(state),
            Self::Custom(c) => c.hash(state),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn items(f: &mut fmt::Formatter<'_>, values: &[PropertyValue]) -> fmt::Result {
            write!(f, "[")?;
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "]")
        }

        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Unsigned(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::LocalDateTime(dt) => write!(f, "{dt}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Url(u) => write!(f, "{u}"),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Enum { variant, .. } => write!(f, "{variant}"),
            Self::Array(values) | Self::List(values) | Self::Set(values) => items(f, values),
            Self::Optional(Some(value)) => write!(f, "Some({value})"),
            Self::Optional(None) => write!(f, "None"),
            Self::Custom(c) => write!(f, "<{}>", c.type_name()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<char> for PropertyValue {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Duration> for PropertyValue {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl From<TypeInfo> for PropertyValue {
    /// Type arguments are passed as their display name
    fn from(value: TypeInfo) -> Self {
        Self::String(value.type_name())
    }
}
