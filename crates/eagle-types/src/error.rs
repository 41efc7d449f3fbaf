//! Type conversion error types.

use thiserror::Error;

/// Errors that can occur while resolving column types or converting fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The protocol declared a type name that has no mapping.
    #[error("unknown column type: {0}")]
    UnknownType(String),

    /// A field could not be parsed as the column's declared type.
    #[error("invalid {column_type} value: {value:?}")]
    InvalidValue {
        /// Protocol name of the declared type.
        column_type: &'static str,
        /// The offending field text.
        value: String,
    },

    /// No column with the requested name exists.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A value was requested as a type it does not hold.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        actual: &'static str,
    },
}
