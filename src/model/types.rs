//! Target type descriptors
//!
//! A [`TypeInfo`] describes the declared return type of an operation, including the
//! type parameters of generic containers. Converters are selected against the raw
//! (parameter-stripped) form returned by [`TypeInfo::raw`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type information for conversion targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeInfo {
    /// Plain string, never converted
    String,
    /// Boolean value
    Boolean,
    /// Single character
    Char,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// Pointer-sized signed integer
    Isize,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit unsigned integer
    U64,
    /// Pointer-sized unsigned integer
    Usize,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Decimal value with arbitrary precision
    Decimal,
    /// Signed duration
    Duration,
    /// DateTime with offset
    DateTime,
    /// DateTime without offset
    LocalDateTime,
    /// Date value (YYYY-MM-DD)
    Date,
    /// Time value (HH:MM:SS)
    Time,
    /// Absolute URL
    Url,
    /// Filesystem path
    Path,

    /// Enumeration converted by variant name
    Enum {
        /// Enum type name
        name: String,
        /// Accepted variant names
        variants: Vec<String>,
    },

    /// Array with its component type
    Array(Box<TypeInfo>),
    /// List, optionally parameterized with its element type
    List(Option<Box<TypeInfo>>),
    /// Set, optionally parameterized with its element type
    Set(Option<Box<TypeInfo>>),
    /// Optional (absent-tolerant) wrapper, optionally parameterized with its inner type
    Optional(Option<Box<TypeInfo>>),

    /// Unresolved generic type parameter (e.g. `T`)
    TypeVariable(String),

    /// Caller-defined type handled by caller-registered converters
    Named(String),
}

impl TypeInfo {
    /// List of the given element type
    pub fn list_of(element: TypeInfo) -> Self {
        TypeInfo::List(Some(Box::new(element)))
    }

    /// Set of the given element type
    pub fn set_of(element: TypeInfo) -> Self {
        TypeInfo::Set(Some(Box::new(element)))
    }

    /// Array of the given component type
    pub fn array_of(component: TypeInfo) -> Self {
        TypeInfo::Array(Box::new(component))
    }

    /// Optional of the given inner type
    pub fn optional_of(inner: TypeInfo) -> Self {
        TypeInfo::Optional(Some(Box::new(inner)))
    }

    /// Enumeration type
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeInfo::Enum {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// The raw form of this type with generic type parameters erased.
    ///
    /// Arrays keep their (raw) component type since an array type is not complete
    /// without one.
    pub fn raw(&self) -> TypeInfo {
        match self {
            TypeInfo::List(_) => TypeInfo::List(None),
            TypeInfo::Set(_) => TypeInfo::Set(None),
            TypeInfo::Optional(_) => TypeInfo::Optional(None),
            TypeInfo::Array(component) => TypeInfo::Array(Box::new(component.raw())),
            other => other.clone(),
        }
    }

    /// Generic type parameters declared on this type
    pub fn type_parameters(&self) -> Vec<&TypeInfo> {
        match self {
            TypeInfo::List(Some(elem))
            | TypeInfo::Set(Some(elem))
            | TypeInfo::Optional(Some(elem)) => vec![elem.as_ref()],
            TypeInfo::Array(component) => vec![component.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Element type of a container, defaulting to `String` for raw containers
    pub fn element_type(&self) -> Option<&TypeInfo> {
        static STRING: TypeInfo = TypeInfo::String;
        match self {
            TypeInfo::Array(component) => Some(component),
            TypeInfo::List(elem) | TypeInfo::Set(elem) | TypeInfo::Optional(elem) => {
                Some(elem.as_deref().unwrap_or(&STRING))
            }
            _ => None,
        }
    }

    /// Check if this is the absent-tolerant optional wrapper
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeInfo::Optional(_))
    }

    /// Check if this is an unresolved type variable
    pub fn is_type_variable(&self) -> bool {
        matches!(self, TypeInfo::TypeVariable(_))
    }

    /// Check if this is a container type (array, list, set or optional)
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TypeInfo::Array(_) | TypeInfo::List(_) | TypeInfo::Set(_) | TypeInfo::Optional(_)
        )
    }

    /// Check if this type is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeInfo::I8
                | TypeInfo::I16
                | TypeInfo::I32
                | TypeInfo::I64
                | TypeInfo::Isize
                | TypeInfo::U8
                | TypeInfo::U16
                | TypeInfo::U32
                | TypeInfo::U64
                | TypeInfo::Usize
        )
    }

    /// Check if this type is handled by the primitive converter
    pub fn is_primitive(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                TypeInfo::Boolean | TypeInfo::Char | TypeInfo::F32 | TypeInfo::F64
            )
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn param(f: &mut fmt::Formatter<'_>, name: &str, p: &Option<Box<TypeInfo>>) -> fmt::Result {
            match p {
                Some(inner) => write!(f, "{name}<{inner}>"),
                None => write!(f, "{name}"),
            }
        }

        match self {
            TypeInfo::String => write!(f, "String"),
            TypeInfo::Boolean => write!(f, "bool"),
            TypeInfo::Char => write!(f, "char"),
            TypeInfo::I8 => write!(f, "i8"),
            TypeInfo::I16 => write!(f, "i16"),
            TypeInfo::I32 => write!(f, "i32"),
            TypeInfo::I64 => write!(f, "i64"),
            TypeInfo::Isize => write!(f, "isize"),
            TypeInfo::U8 => write!(f, "u8"),
            TypeInfo::U16 => write!(f, "u16"),
            TypeInfo::U32 => write!(f, "u32"),
            TypeInfo::U64 => write!(f, "u64"),
            TypeInfo::Usize => write!(f, "usize"),
            TypeInfo::F32 => write!(f, "f32"),
            TypeInfo::F64 => write!(f, "f64"),
            TypeInfo::Decimal => write!(f, "Decimal"),
            TypeInfo::Duration => write!(f, "Duration"),
            TypeInfo::DateTime => write!(f, "DateTime"),
            TypeInfo::LocalDateTime => write!(f, "LocalDateTime"),
            TypeInfo::Date => write!(f, "Date"),
            TypeInfo::Time => write!(f, "Time"),
            TypeInfo::Url => write!(f, "Url"),
            TypeInfo::Path => write!(f, "Path"),
            TypeInfo::Enum { name, .. } => write!(f, "{name}"),
            TypeInfo::Array(component) => write!(f, "[{component}]"),
            TypeInfo::List(elem) => param(f, "List", elem),
            TypeInfo::Set(elem) => param(f, "Set", elem),
            TypeInfo::Optional(inner) => param(f, "Optional", inner),
            TypeInfo::TypeVariable(name) => write!(f, "{name}"),
            TypeInfo::Named(name) => write!(f, "{name}"),
        }
    }
}
