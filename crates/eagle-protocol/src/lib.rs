//! # eagle-protocol
//!
//! Parser for the line-oriented response protocol of the EAGLE query service.
//!
//! A successful query response looks like this:
//!
//! ```text
//! #OK
//! <zero or more discarded lines>
//! #QUERYTIMEOUT ...
//! #QUERYTIME ...
//! #COLUMN 0 name=<id> JDBC_TYPE=<int> JDBC_TYPENAME=<id>
//! ...
//! <plain-text column-name summary line>
//! <comma-delimited data row>
//! ...
//! ```
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. [`ResponseParser`] is push-based:
//! callers feed it one line at a time and collect the [`ResultSet`] at end of
//! stream, so any reader can drive it incrementally. The async framing lives
//! in `eagle-codec`.
//!
//! ## Example
//!
//! ```rust
//! use eagle_protocol::parse_response;
//!
//! let body = "#OK\n#QUERYTIMEOUT 2024\n#QUERYTIME 5\n\
//!             #COLUMN 0 name=val JDBC_TYPE=4 JDBC_TYPENAME=int\nval\n1\n2\n";
//! let result = parse_response(body).unwrap();
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.rows()[1].get_by_name("val").and_then(|v| v.as_i32()), Some(2));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod header;
pub mod parser;
pub mod result;

pub use error::ProtocolError;
pub use header::{
    COMMENT_PREFIX, ColumnDescriptor, FIELD_DELIMITER, OK_MARKER, QUERY_TIME_MARKER,
    QUERY_TIMEOUT_MARKER,
};
pub use parser::{ParserState, ResponseParser, parse_lines, parse_response};
pub use result::{DocPage, ResultSet, Row};
