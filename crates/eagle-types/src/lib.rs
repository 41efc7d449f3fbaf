//! # eagle-types
//!
//! Column type mapping and typed values for the EAGLE query protocol.
//!
//! The query service declares the type of every result column by name in the
//! response header. This crate holds the static table that maps those names
//! to in-memory value types, and the closed [`Value`] variant that data row
//! fields are converted into.
//!
//! ## Type Mappings
//!
//! | Protocol Type | [`ColumnType`] | Rust Type |
//! |---------------|----------------|-----------|
//! | `real` | `Real` | `f32` |
//! | `float` | `Float` | `f64` |
//! | `int` | `Int` | `i32` |
//! | `bigint` | `BigInt` | `i64` |
//! | `char` | `Char` | [`BoundedText`] |
//! | `nvarchar` | `NVarChar` | [`BoundedText`] |
//!
//! Text values are capped at [`TEXT_CAPACITY`] bytes, the limit the service
//! itself declares for character columns.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod column_type;
pub mod error;
pub mod text;
pub mod value;

pub use column_type::ColumnType;
pub use error::TypeError;
pub use text::{BoundedText, TEXT_CAPACITY};
pub use value::Value;
