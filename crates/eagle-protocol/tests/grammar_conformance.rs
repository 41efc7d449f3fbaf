//! Response grammar conformance tests.
//!
//! These tests feed complete response bodies through the parser and check
//! the shape of the result or the class of the failure.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use eagle_protocol::{ProtocolError, ResponseParser, parse_lines, parse_response};
use eagle_types::{ColumnType, Value};
use proptest::prelude::*;

fn header(columns: &[(&str, &str)]) -> String {
    let mut body = String::from("#OK\n#QUERYTIMEOUT 2024\n#QUERYTIME 5\n");
    for (i, (name, ty)) in columns.iter().enumerate() {
        body.push_str(&format!(
            "#COLUMN {i} name={name} JDBC_TYPE=4 JDBC_TYPENAME={ty}\n"
        ));
    }
    let names: Vec<&str> = columns.iter().map(|(n, _)| *n).collect();
    body.push_str(&names.join(","));
    body.push('\n');
    body
}

// =============================================================================
// Documented Scenarios
// =============================================================================

#[test]
fn test_documented_select_one() {
    let body = "#OK\n#QUERYTIMEOUT 2024\n#QUERYTIME 5\n\
                #COLUMN 0 name=val JDBC_TYPE=4 JDBC_TYPENAME=int\nval\n1\n2\n";
    let result = parse_response(body).unwrap();

    assert_eq!(result.columns().len(), 1);
    assert_eq!(result.columns()[0].name, "val");
    assert_eq!(result.columns()[0].jdbc_type_name, "int");
    assert_eq!(result.len(), 2);
    assert_eq!(result.rows()[0].try_get::<i32>("val").unwrap(), 1);
    assert_eq!(result.rows()[1].try_get::<i32>("val").unwrap(), 2);
}

#[test]
fn test_documented_missing_timeout_marker() {
    let body = "#OK\n#QUERYTIME 5\n\
                #COLUMN 0 name=val JDBC_TYPE=4 JDBC_TYPENAME=int\nval\n1\n2\n";
    let err = parse_response(body).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::UnexpectedEndOfHeader | ProtocolError::UnrecognizedHeader { .. }
    ));
    assert!(err.is_header_error());
}

#[test]
fn test_stream_ending_after_ok() {
    let err = parse_response("#OK\n").unwrap_err();
    assert_eq!(err, ProtocolError::UnexpectedEndOfHeader);
}

#[test]
fn test_wrong_first_line_reports_remaining_stream() {
    let body = "<html><body>\nHTTP Status 500 - query failed\n</body></html>\n";
    let err = parse_response(body).unwrap_err();
    let diagnostic = err.diagnostic();
    assert!(diagnostic.contains("HTTP Status 500 - query failed"));
    assert!(diagnostic.contains("</body></html>"));
}

#[test]
fn test_unknown_type_with_zero_rows() {
    let body = header(&[("a", "int"), ("b", "decimal")]);
    let err = parse_response(&body).unwrap_err();
    assert_eq!(
        err,
        ProtocolError::UnknownColumnType {
            column: "b".into(),
            type_name: "decimal".into()
        }
    );
}

#[test]
fn test_unknown_type_fails_before_first_row_is_seen() {
    let mut parser = ResponseParser::new();
    for line in ["#OK", "#QUERYTIMEOUT 1", "#QUERYTIME 1"] {
        parser.feed_line(line).unwrap();
    }
    let err = parser
        .feed_line("#COLUMN 0 name=t JDBC_TYPE=91 JDBC_TYPENAME=date")
        .unwrap_err();
    assert!(matches!(err, ProtocolError::UnknownColumnType { .. }));
    assert_eq!(parser.rows_read(), 0);
}

// =============================================================================
// Header Edge Cases
// =============================================================================

#[test]
fn test_stream_ending_inside_column_section() {
    let body = "#OK\n#QUERYTIMEOUT 1\n#QUERYTIME 1\n\
                #COLUMN 0 name=a JDBC_TYPE=4 JDBC_TYPENAME=int\n";
    let result = parse_response(body).unwrap();
    assert_eq!(result.columns().len(), 1);
    assert!(result.is_empty());
}

#[test]
fn test_no_columns_declared() {
    let result = parse_response("#OK\n#QUERYTIMEOUT 1\n#QUERYTIME 1\n\n").unwrap();
    assert!(result.columns().is_empty());
    assert!(result.is_empty());
}

#[test]
fn test_negative_jdbc_type_codes() {
    let body = "#OK\n#QUERYTIMEOUT 1\n#QUERYTIME 1\n\
                #COLUMN 0 name=n JDBC_TYPE=-9 JDBC_TYPENAME=nvarchar\nn\nabc\n";
    let result = parse_response(body).unwrap();
    assert_eq!(result.columns()[0].jdbc_type_code, -9);
    assert_eq!(result.columns()[0].column_type, ColumnType::NVarChar);
}

#[test]
fn test_long_text_fields_are_truncated() {
    let long = "y".repeat(500);
    let body = format!("{}{long}\n", header(&[("s", "char")]));
    let result = parse_response(&body).unwrap();
    let text = result.rows()[0].get(0).and_then(Value::as_str).unwrap();
    assert_eq!(text.len(), 256);
}

#[test]
fn test_parse_lines_accepts_owned_strings() {
    let lines: Vec<String> = header(&[("a", "bigint")])
        .lines()
        .map(str::to_owned)
        .chain(std::iter::once("12".to_owned()))
        .collect();
    let result = parse_lines(lines).unwrap();
    assert_eq!(result.rows()[0].get(0), Some(&Value::BigInt(12)));
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_well_formed_response_shape(
        ncols in 1usize..8,
        values in proptest::collection::vec(any::<i32>(), 0..40),
    ) {
        let names: Vec<String> = (0..ncols).map(|i| format!("c{i}")).collect();
        let cols: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "int")).collect();
        let mut body = header(&cols);

        let nrows = values.len() / ncols;
        for chunk in values.chunks_exact(ncols) {
            let fields: Vec<String> = chunk.iter().map(i32::to_string).collect();
            body.push_str(&fields.join(","));
            body.push('\n');
        }

        let result = parse_response(&body).unwrap();
        prop_assert_eq!(result.columns().len(), ncols);
        prop_assert_eq!(result.len(), nrows);
        for (i, col) in result.columns().iter().enumerate() {
            prop_assert_eq!(col.index, i);
            prop_assert_eq!(&col.name, &names[i]);
        }
        for (r, row) in result.rows().iter().enumerate() {
            prop_assert_eq!(row.len(), ncols);
            for c in 0..ncols {
                prop_assert_eq!(row.get(c), Some(&Value::Int(values[r * ncols + c])));
            }
        }
    }

    #[test]
    fn prop_truncated_header_never_yields_result(cut in 0usize..3) {
        let lines = ["#OK", "#QUERYTIMEOUT 1", "#QUERYTIME 1"];
        prop_assert!(parse_lines(&lines[..cut]).is_err());
    }
}
