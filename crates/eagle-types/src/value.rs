//! Typed field values.

use std::fmt;

use crate::column_type::ColumnType;
use crate::error::TypeError;
use crate::text::BoundedText;

/// A single field of a result row.
///
/// The variant is fixed by the column's [`ColumnType`]; every field in a
/// column holds the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit floating point (`real`).
    Real(f32),
    /// 64-bit floating point (`float`).
    Float(f64),
    /// 32-bit signed integer (`int`).
    Int(i32),
    /// 64-bit signed integer (`bigint`).
    BigInt(i64),
    /// Fixed-capacity text (`char`, `nvarchar`).
    Text(BoundedText),
}

impl Value {
    /// Get the value as an i32, if it is one.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as an i64, widening from `Int`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::BigInt(v) => Some(*v),
            Self::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Get the value as an f32, if it is one.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as an f64, widening from `Real`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Real(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Get the variant name as a string.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Real(_) => "real",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::BigInt(_) => "bigint",
            Self::Text(_) => "text",
        }
    }

    /// Check whether this value is of the variant `ty` produces.
    #[must_use]
    pub fn matches(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (Self::Real(_), ColumnType::Real)
                | (Self::Float(_), ColumnType::Float)
                | (Self::Int(_), ColumnType::Int)
                | (Self::BigInt(_), ColumnType::BigInt)
                | (Self::Text(_), ColumnType::Char | ColumnType::NVarChar)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Real(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(BoundedText::new(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(BoundedText::from_string(v))
    }
}

impl TryFrom<&Value> for i32 {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_i32().ok_or(TypeError::TypeMismatch {
            expected: "int",
            actual: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for i64 {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_i64().ok_or(TypeError::TypeMismatch {
            expected: "bigint",
            actual: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for f32 {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_f32().ok_or(TypeError::TypeMismatch {
            expected: "real",
            actual: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for f64 {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_f64().ok_or(TypeError::TypeMismatch {
            expected: "float",
            actual: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for String {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_str().map(str::to_owned).ok_or(TypeError::TypeMismatch {
            expected: "text",
            actual: value.type_name(),
        })
    }
}
