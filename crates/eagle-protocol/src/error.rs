//! Protocol error types.

use eagle_types::TypeError;
use thiserror::Error;

/// A deviation from the response grammar.
///
/// All variants are fatal for the call that produced them. They indicate a
/// service change or a malformed response, never a transient fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The first line was not the `#OK` success marker.
    ///
    /// The service reports query failures this way; the rest of the stream
    /// usually carries its error message.
    #[error("query rejected by service: {}", diagnostic_text(.first_line, .remainder, .truncated))]
    NotOk {
        /// The line received in place of `#OK` (empty at end of stream).
        first_line: String,
        /// The remaining lines of the response.
        remainder: Vec<String>,
        /// Whether `remainder` was cut short.
        truncated: bool,
    },

    /// The stream ended before the header was complete.
    #[error("unexpected end of stream while reading result header")]
    UnexpectedEndOfHeader,

    /// The line after `#QUERYTIMEOUT` was not `#QUERYTIME`.
    #[error("unrecognized result header: {line:?}")]
    UnrecognizedHeader {
        /// The offending line.
        line: String,
    },

    /// A `#` line in the column section did not match the `#COLUMN` grammar.
    #[error("unrecognized column descriptor: {line:?}")]
    UnrecognizedColumn {
        /// The offending line.
        line: String,
    },

    /// A column declared a type name the type mapper does not know.
    #[error("unknown column type {type_name:?} for column {column:?}")]
    UnknownColumnType {
        /// The column name.
        column: String,
        /// The declared `JDBC_TYPENAME`.
        type_name: String,
    },

    /// Two columns were declared with the same name.
    #[error("duplicate column name: {name:?}")]
    DuplicateColumn {
        /// The repeated name.
        name: String,
    },

    /// A data row did not have one field per column.
    #[error("line {line_number}: expected {expected} fields, got {actual}")]
    FieldCount {
        /// 1-based line number in the response.
        line_number: usize,
        /// Number of declared columns.
        expected: usize,
        /// Number of fields found.
        actual: usize,
    },

    /// A field could not be converted to its column's type.
    #[error("line {line_number}, column {column:?}: {source}")]
    InvalidField {
        /// 1-based line number in the response.
        line_number: usize,
        /// The column name.
        column: String,
        /// The conversion failure.
        #[source]
        source: TypeError,
    },
}

impl ProtocolError {
    /// The best-effort diagnostic text for a rejected query.
    ///
    /// For [`ProtocolError::NotOk`] this is the received first line followed by
    /// the remainder of the stream. Other variants return an empty string.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::NotOk {
                first_line,
                remainder,
                truncated,
            } => diagnostic_text(first_line, remainder, truncated),
            _ => String::new(),
        }
    }

    /// Check whether this error was raised while reading the header.
    #[must_use]
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            Self::NotOk { .. }
                | Self::UnexpectedEndOfHeader
                | Self::UnrecognizedHeader { .. }
                | Self::UnrecognizedColumn { .. }
                | Self::UnknownColumnType { .. }
                | Self::DuplicateColumn { .. }
        )
    }
}

fn diagnostic_text(first_line: &str, remainder: &[String], truncated: &bool) -> String {
    let mut text = String::new();
    for line in std::iter::once(first_line).chain(remainder.iter().map(String::as_str)) {
        if line.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
    }
    if text.is_empty() {
        text.push_str("<empty response>");
    }
    if *truncated {
        text.push_str("\n...");
    }
    text
}
