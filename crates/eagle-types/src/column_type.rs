//! The static type mapper.
//!
//! Every `#COLUMN` header line carries a `JDBC_TYPENAME`. The column's
//! [`ColumnType`] is resolved once from that name when the result schema is
//! built, and then drives the conversion of every field in that column.

use std::fmt;

use crate::error::TypeError;
use crate::text::BoundedText;
use crate::value::Value;

/// Value type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 32-bit floating point (`real`).
    Real,
    /// 64-bit floating point (`float`).
    Float,
    /// 32-bit signed integer (`int`).
    Int,
    /// 64-bit signed integer (`bigint`).
    BigInt,
    /// Fixed-capacity text (`char`).
    Char,
    /// Fixed-capacity text (`nvarchar`).
    NVarChar,
}

impl ColumnType {
    /// All mapped column types.
    pub const ALL: [ColumnType; 6] = [
        Self::Real,
        Self::Float,
        Self::Int,
        Self::BigInt,
        Self::Char,
        Self::NVarChar,
    ];

    /// Resolve a protocol type name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownType`] for names outside the mapping table.
    pub fn from_type_name(name: &str) -> Result<Self, TypeError> {
        match name {
            "real" => Ok(Self::Real),
            "float" => Ok(Self::Float),
            "int" => Ok(Self::Int),
            "bigint" => Ok(Self::BigInt),
            "char" => Ok(Self::Char),
            "nvarchar" => Ok(Self::NVarChar),
            other => Err(TypeError::UnknownType(other.to_owned())),
        }
    }

    /// The protocol name of this type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Float => "float",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Char => "char",
            Self::NVarChar => "nvarchar",
        }
    }

    /// Check if values of this type are text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Char | Self::NVarChar)
    }

    /// Check if values of this type are numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !self.is_text()
    }

    /// Convert one field of a data row into a value of this type.
    ///
    /// Numeric fields are trimmed of surrounding whitespace before parsing.
    /// Text fields are kept verbatim and truncated to the text capacity.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidValue`] if a numeric field does not parse.
    pub fn parse_field(&self, field: &str) -> Result<Value, TypeError> {
        let invalid = || TypeError::InvalidValue {
            column_type: self.type_name(),
            value: field.to_owned(),
        };

        match self {
            Self::Real => field.trim().parse().map(Value::Real).map_err(|_| invalid()),
            Self::Float => field.trim().parse().map(Value::Float).map_err(|_| invalid()),
            Self::Int => field.trim().parse().map(Value::Int).map_err(|_| invalid()),
            Self::BigInt => field.trim().parse().map(Value::BigInt).map_err(|_| invalid()),
            Self::Char | Self::NVarChar => Ok(Value::Text(BoundedText::new(field))),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl std::str::FromStr for ColumnType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_type_name(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_round_trips_through_mapper() {
        for ty in ColumnType::ALL {
            assert_eq!(ColumnType::from_type_name(ty.type_name()).unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_type_name() {
        let err = ColumnType::from_type_name("datetime").unwrap_err();
        assert_eq!(err, TypeError::UnknownType("datetime".into()));
    }

    #[test]
    fn test_type_names_are_case_sensitive() {
        assert!(ColumnType::from_type_name("INT").is_err());
    }

    #[test]
    fn test_parse_numeric_fields() {
        assert_eq!(ColumnType::Int.parse_field("42").unwrap(), Value::Int(42));
        assert_eq!(ColumnType::Int.parse_field(" -7 ").unwrap(), Value::Int(-7));
        assert_eq!(
            ColumnType::BigInt.parse_field("8000000000").unwrap(),
            Value::BigInt(8_000_000_000)
        );
        assert_eq!(ColumnType::Real.parse_field("1.5").unwrap(), Value::Real(1.5));
        assert_eq!(
            ColumnType::Float.parse_field("2.5e10").unwrap(),
            Value::Float(2.5e10)
        );
    }

    #[test]
    fn test_int_overflow_is_invalid() {
        let err = ColumnType::Int.parse_field("8000000000").unwrap_err();
        assert!(matches!(err, TypeError::InvalidValue { column_type: "int", .. }));
    }

    #[test]
    fn test_empty_numeric_field_is_invalid() {
        assert!(ColumnType::Float.parse_field("").is_err());
    }

    #[test]
    fn test_text_fields_are_verbatim() {
        let value = ColumnType::NVarChar.parse_field(" padded ").unwrap();
        assert_eq!(value.as_str(), Some(" padded "));
    }

    #[test]
    fn test_classification() {
        assert!(ColumnType::Char.is_text());
        assert!(ColumnType::NVarChar.is_text());
        assert!(ColumnType::Real.is_numeric());
        assert!(!ColumnType::BigInt.is_text());
    }
}
