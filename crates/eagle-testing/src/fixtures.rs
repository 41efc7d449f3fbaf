//! Response body fixtures.

/// Session cookie issued by the mock service.
pub const SESSION_COOKIE: &str = "JSESSIONID=mock-session-1; Path=/Eagle";

/// Two rows covering every numeric column type plus text.
pub const SELECT_SMALL: &str = "#OK\n\
#QUERYTIMEOUT 2024-01-01 00:00:00\n\
#QUERYTIME 12\n\
#COLUMN 0 name=GalaxyID JDBC_TYPE=-5 JDBC_TYPENAME=bigint\n\
#COLUMN 1 name=SnapNum JDBC_TYPE=4 JDBC_TYPENAME=int\n\
#COLUMN 2 name=Redshift JDBC_TYPE=7 JDBC_TYPENAME=real\n\
#COLUMN 3 name=Mass JDBC_TYPE=8 JDBC_TYPENAME=float\n\
#COLUMN 4 name=Name JDBC_TYPE=-9 JDBC_TYPENAME=nvarchar\n\
GalaxyID,SnapNum,Redshift,Mass,Name\n\
8253667,28,0.0,1.5e10,first\n\
8253668,27,0.1,2.25e9,second\n";

/// A header with columns but no rows.
pub const EMPTY_RESULT: &str = "#OK\n\
#QUERYTIMEOUT 2024-01-01 00:00:00\n\
#QUERYTIME 3\n\
#COLUMN 0 name=GalaxyID JDBC_TYPE=-5 JDBC_TYPENAME=bigint\n\
GalaxyID\n";

/// The service rejecting a query.
pub const REJECTED: &str = "Error executing query\n\
Incorrect syntax near the keyword 'FROM'.\n";

/// A response cut off inside the header.
pub const TRUNCATED_HEADER: &str = "#OK\n#QUERYTIMEOUT 2024-01-01 00:00:00\n";

/// A column line outside the grammar.
pub const BAD_COLUMN: &str = "#OK\n\
#QUERYTIMEOUT 1\n\
#QUERYTIME 1\n\
#COLUMN 0 name=x JDBC_TYPE=int\n";

/// A documentation page.
pub const DOCS_PAGE: &str = "<html>\n\
<h1>RefL0012N0188_Subhalo</h1>\n\
<p>Galaxy properties.</p>\n\
</html>\n";

/// JDBC type code for a column type name.
#[must_use]
pub fn jdbc_type_code(type_name: &str) -> i32 {
    match type_name {
        "char" => 1,
        "int" => 4,
        "real" => 7,
        "float" => 8,
        "bigint" => -5,
        "nvarchar" => -9,
        _ => 1111,
    }
}

/// Render a well-formed response body.
///
/// `columns` are `(name, type_name)` pairs; rows are written verbatim,
/// joined with commas.
#[must_use]
pub fn result_body(columns: &[(&str, &str)], rows: &[Vec<String>]) -> String {
    let mut body = String::from("#OK\n#QUERYTIMEOUT 1\n#QUERYTIME 1\n");
    for (index, (name, type_name)) in columns.iter().enumerate() {
        body.push_str(&format!(
            "#COLUMN {index} name={name} JDBC_TYPE={} JDBC_TYPENAME={type_name}\n",
            jdbc_type_code(type_name)
        ));
    }
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    body.push_str(&names.join(","));
    body.push('\n');
    for row in rows {
        body.push_str(&row.join(","));
        body.push('\n');
    }
    body
}
