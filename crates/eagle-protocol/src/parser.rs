//! Response protocol state machine.
//!
//! The parser walks the states below in strict order and never backtracks:
//!
//! ```text
//! AwaitOk -> SkipToTimeout -> ExpectQueryTime -> ReadColumns -> ReadRows
//!    |
//!    +-> Rejected (collects the rest of the stream as a diagnostic)
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use eagle_types::Value;

use crate::error::ProtocolError;
use crate::header::{
    COMMENT_PREFIX, ColumnDescriptor, FIELD_DELIMITER, OK_MARKER, QUERY_TIME_MARKER,
    QUERY_TIMEOUT_MARKER, marker_argument,
};
use crate::result::{ResultSet, Row};

/// Upper bound on the diagnostic text kept for a rejected query.
pub const MAX_DIAGNOSTIC_BYTES: usize = 64 * 1024;

/// Observable parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the `#OK` line.
    AwaitOk,
    /// The first line was not `#OK`; the rest of the stream is collected.
    Rejected,
    /// Discarding lines until `#QUERYTIMEOUT`.
    SkipToTimeout,
    /// The next line must be `#QUERYTIME`.
    ExpectQueryTime,
    /// Reading `#COLUMN` descriptors.
    ReadColumns,
    /// Reading comma-delimited data rows.
    ReadRows,
}

enum State {
    AwaitOk,
    Rejected {
        first_line: String,
        remainder: Vec<String>,
        bytes: usize,
        truncated: bool,
    },
    SkipToTimeout,
    ExpectQueryTime,
    ReadColumns {
        columns: Vec<ColumnDescriptor>,
        names: HashSet<String>,
    },
    ReadRows {
        columns: Arc<[ColumnDescriptor]>,
    },
}

/// Push-based parser for one query response.
///
/// Feed every line of the response body (without its terminator) to
/// [`feed_line`](Self::feed_line), then call [`finish`](Self::finish) at end
/// of stream. Any error voids the whole response; no partial result set is
/// ever produced.
///
/// # Example
///
/// ```rust
/// use eagle_protocol::ResponseParser;
///
/// let mut parser = ResponseParser::new();
/// for line in ["#OK", "#QUERYTIMEOUT 60", "#QUERYTIME 1",
///              "#COLUMN 0 name=n JDBC_TYPE=4 JDBC_TYPENAME=int", "n", "7"] {
///     parser.feed_line(line).unwrap();
/// }
/// let result = parser.finish().unwrap();
/// assert_eq!(result.rows()[0].get(0).and_then(|v| v.as_i32()), Some(7));
/// ```
pub struct ResponseParser {
    state: State,
    rows: Vec<Row>,
    line_number: usize,
    query_timeout: Option<String>,
    query_time: Option<String>,
}

impl ResponseParser {
    /// Create a parser waiting for the first line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::AwaitOk,
            rows: Vec::new(),
            line_number: 0,
            query_timeout: None,
            query_time: None,
        }
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> ParserState {
        match self.state {
            State::AwaitOk => ParserState::AwaitOk,
            State::Rejected { .. } => ParserState::Rejected,
            State::SkipToTimeout => ParserState::SkipToTimeout,
            State::ExpectQueryTime => ParserState::ExpectQueryTime,
            State::ReadColumns { .. } => ParserState::ReadColumns,
            State::ReadRows { .. } => ParserState::ReadRows,
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Number of data rows parsed so far.
    #[must_use]
    pub fn rows_read(&self) -> usize {
        self.rows.len()
    }

    /// Consume one line of the response.
    ///
    /// A rejected response keeps accepting lines so the service's error text
    /// can be reported by [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] as soon as the line violates the grammar.
    /// The parser must not be used after an error.
    pub fn feed_line(&mut self, line: &str) -> Result<(), ProtocolError> {
        self.line_number += 1;

        match &mut self.state {
            State::AwaitOk => {
                if line == OK_MARKER {
                    self.state = State::SkipToTimeout;
                } else {
                    self.state = State::Rejected {
                        first_line: line.to_owned(),
                        remainder: Vec::new(),
                        bytes: line.len(),
                        truncated: false,
                    };
                }
            }
            State::Rejected {
                remainder,
                bytes,
                truncated,
                ..
            } => {
                // The diagnostic keeps a contiguous prefix of the stream
                if *truncated {
                    return Ok(());
                }
                if *bytes + line.len() > MAX_DIAGNOSTIC_BYTES {
                    *truncated = true;
                } else {
                    *bytes += line.len();
                    remainder.push(line.to_owned());
                }
            }
            State::SkipToTimeout => {
                if line.starts_with(QUERY_TIMEOUT_MARKER) {
                    self.query_timeout =
                        marker_argument(line, QUERY_TIMEOUT_MARKER).map(str::to_owned);
                    self.state = State::ExpectQueryTime;
                }
            }
            State::ExpectQueryTime => {
                if !line.starts_with(QUERY_TIME_MARKER) {
                    return Err(ProtocolError::UnrecognizedHeader {
                        line: line.to_owned(),
                    });
                }
                self.query_time = marker_argument(line, QUERY_TIME_MARKER).map(str::to_owned);
                self.state = State::ReadColumns {
                    columns: Vec::new(),
                    names: HashSet::new(),
                };
            }
            State::ReadColumns { columns, names } => {
                if line.starts_with(COMMENT_PREFIX) {
                    let column = ColumnDescriptor::parse(line)?;
                    if !names.insert(column.name.clone()) {
                        return Err(ProtocolError::DuplicateColumn { name: column.name });
                    }
                    columns.push(column);
                } else {
                    // Column-name summary line; not a data row.
                    let columns: Arc<[ColumnDescriptor]> = std::mem::take(columns).into();
                    self.state = State::ReadRows { columns };
                }
            }
            State::ReadRows { columns } => {
                if line.trim().is_empty() {
                    return Ok(());
                }
                let row = parse_row(columns, line, self.line_number)?;
                self.rows.push(row);
            }
        }

        Ok(())
    }

    /// Signal end of stream and produce the result set.
    ///
    /// End of stream while reading columns yields an empty result set with
    /// the columns declared so far.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NotOk`] for a rejected response,
    /// [`ProtocolError::UnexpectedEndOfHeader`] if no `#QUERYTIMEOUT` line
    /// arrived, and [`ProtocolError::UnrecognizedHeader`] with an empty line
    /// if the stream ended before `#QUERYTIME`.
    pub fn finish(self) -> Result<ResultSet, ProtocolError> {
        let columns: Arc<[ColumnDescriptor]> = match self.state {
            State::AwaitOk => {
                return Err(ProtocolError::NotOk {
                    first_line: String::new(),
                    remainder: Vec::new(),
                    truncated: false,
                });
            }
            State::Rejected {
                first_line,
                remainder,
                truncated,
                ..
            } => {
                return Err(ProtocolError::NotOk {
                    first_line,
                    remainder,
                    truncated,
                });
            }
            State::SkipToTimeout => {
                return Err(ProtocolError::UnexpectedEndOfHeader);
            }
            // A missing query-time line reads as an empty one
            State::ExpectQueryTime => {
                return Err(ProtocolError::UnrecognizedHeader {
                    line: String::new(),
                });
            }
            State::ReadColumns { columns, .. } => columns.into(),
            State::ReadRows { columns } => columns,
        };

        Ok(ResultSet::new(
            columns,
            self.rows,
            self.query_timeout,
            self.query_time,
        ))
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_row(
    columns: &Arc<[ColumnDescriptor]>,
    line: &str,
    line_number: usize,
) -> Result<Row, ProtocolError> {
    let mut values = Vec::with_capacity(columns.len());
    let mut fields = line.split(FIELD_DELIMITER);

    for column in columns.iter() {
        let Some(field) = fields.next() else {
            return Err(ProtocolError::FieldCount {
                line_number,
                expected: columns.len(),
                actual: values.len(),
            });
        };
        let value: Value =
            column
                .column_type
                .parse_field(field)
                .map_err(|source| ProtocolError::InvalidField {
                    line_number,
                    column: column.name.clone(),
                    source,
                })?;
        values.push(value);
    }

    let extra = fields.count();
    if extra > 0 {
        return Err(ProtocolError::FieldCount {
            line_number,
            expected: columns.len(),
            actual: columns.len() + extra,
        });
    }

    Ok(Row::new(Arc::clone(columns), values))
}

/// Parse a sequence of response lines.
///
/// # Errors
///
/// Returns the first [`ProtocolError`] encountered.
pub fn parse_lines<I, S>(lines: I) -> Result<ResultSet, ProtocolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = ResponseParser::new();
    for line in lines {
        parser.feed_line(line.as_ref())?;
    }
    parser.finish()
}

/// Parse a complete response body held in memory.
///
/// Both `\n` and `\r\n` line terminators are accepted.
///
/// # Errors
///
/// Returns the first [`ProtocolError`] encountered.
pub fn parse_response(body: &str) -> Result<ResultSet, ProtocolError> {
    parse_lines(body.lines())
}
