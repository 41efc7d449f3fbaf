//! Response header markers and column descriptors.

use eagle_types::ColumnType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ProtocolError;

/// First line of every successful response.
pub const OK_MARKER: &str = "#OK";

/// Prefix of the line announcing the query timeout.
pub const QUERY_TIMEOUT_MARKER: &str = "#QUERYTIMEOUT";

/// Prefix of the line reporting the query time. Must follow the timeout line.
pub const QUERY_TIME_MARKER: &str = "#QUERYTIME";

/// Prefix shared by every header line in the column section.
pub const COMMENT_PREFIX: char = '#';

/// Separator between fields of a data row.
pub const FIELD_DELIMITER: char = ',';

// #COLUMN <index> name=<identifier> JDBC_TYPE=<signed integer> JDBC_TYPENAME=<identifier>
#[allow(clippy::unwrap_used)]
static COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^#COLUMN ([0-9]+) name=([A-Za-z0-9_]+) JDBC_TYPE=(-?[0-9]+) JDBC_TYPENAME=([A-Za-z0-9_]+)$",
    )
    .unwrap()
});

/// Metadata for one result column, as declared by a `#COLUMN` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ColumnDescriptor {
    /// Column index as declared by the service.
    pub index: usize,
    /// Column name.
    pub name: String,
    /// JDBC type code (`java.sql.Types`).
    pub jdbc_type_code: i32,
    /// Declared type name.
    pub jdbc_type_name: String,
    /// Value type resolved from `jdbc_type_name`.
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    /// Create a descriptor for a mapped column type.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        jdbc_type_code: i32,
        column_type: ColumnType,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            jdbc_type_code,
            jdbc_type_name: column_type.type_name().to_owned(),
            column_type,
        }
    }

    /// Parse a `#COLUMN` header line.
    ///
    /// The type name is resolved through the type mapper here, so an unknown
    /// type fails while the schema is being read rather than on the first row.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnrecognizedColumn`] if the line does not match
    /// the grammar, and [`ProtocolError::UnknownColumnType`] if the declared
    /// type has no mapping.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let unrecognized = || ProtocolError::UnrecognizedColumn {
            line: line.to_owned(),
        };

        let caps = COLUMN_RE.captures(line).ok_or_else(unrecognized)?;
        let index = caps[1].parse().map_err(|_| unrecognized())?;
        let name = caps[2].to_owned();
        let jdbc_type_code = caps[3].parse().map_err(|_| unrecognized())?;
        let jdbc_type_name = caps[4].to_owned();

        let column_type = ColumnType::from_type_name(&jdbc_type_name).map_err(|_| {
            ProtocolError::UnknownColumnType {
                column: name.clone(),
                type_name: jdbc_type_name.clone(),
            }
        })?;

        Ok(Self {
            index,
            name,
            jdbc_type_code,
            jdbc_type_name,
            column_type,
        })
    }
}

/// Text following a header marker, if any.
pub(crate) fn marker_argument<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?.trim();
    (!rest.is_empty()).then_some(rest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_line() {
        let col =
            ColumnDescriptor::parse("#COLUMN 0 name=GalaxyID JDBC_TYPE=-5 JDBC_TYPENAME=bigint")
                .unwrap();
        assert_eq!(col.index, 0);
        assert_eq!(col.name, "GalaxyID");
        assert_eq!(col.jdbc_type_code, -5);
        assert_eq!(col.jdbc_type_name, "bigint");
        assert_eq!(col.column_type, ColumnType::BigInt);
    }

    #[test]
    fn test_parse_rejects_extra_spacing() {
        let err =
            ColumnDescriptor::parse("#COLUMN 0  name=val JDBC_TYPE=4 JDBC_TYPENAME=int").unwrap_err();
        assert!(matches!(err, ProtocolError::UnrecognizedColumn { .. }));
    }

    #[test]
    fn test_parse_rejects_trailing_text() {
        let err = ColumnDescriptor::parse("#COLUMN 0 name=val JDBC_TYPE=4 JDBC_TYPENAME=int x")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnrecognizedColumn { .. }));
    }

    #[test]
    fn test_parse_rejects_non_identifier_name() {
        let err = ColumnDescriptor::parse("#COLUMN 0 name=a-b JDBC_TYPE=4 JDBC_TYPENAME=int")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnrecognizedColumn { .. }));
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = ColumnDescriptor::parse("#COLUMN 1 name=t JDBC_TYPE=93 JDBC_TYPENAME=datetime")
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnknownColumnType {
                column: "t".into(),
                type_name: "datetime".into()
            }
        );
    }

    #[test]
    fn test_new_uses_mapper_name() {
        let col = ColumnDescriptor::new(2, "Mass", 7, ColumnType::Real);
        assert_eq!(col.jdbc_type_name, "real");
    }

    #[test]
    fn test_marker_argument() {
        assert_eq!(marker_argument("#QUERYTIME 5", QUERY_TIME_MARKER), Some("5"));
        assert_eq!(marker_argument("#QUERYTIME", QUERY_TIME_MARKER), None);
        assert_eq!(marker_argument("#OK", QUERY_TIME_MARKER), None);
    }
}
