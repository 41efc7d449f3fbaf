//! Parsed query results.

use std::sync::Arc;

use eagle_types::{TypeError, Value};

use crate::header::ColumnDescriptor;

/// One data row of a result set.
///
/// Fields are stored positionally, in column order, and share the result
/// set's column list so they can also be looked up by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[ColumnDescriptor]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[ColumnDescriptor]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Get the column metadata for this row.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Get the number of fields in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a field by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a field by column name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        self.values.get(index)
    }

    /// Get a field by column name, converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::ColumnNotFound`] for an unknown name, or
    /// [`TypeError::TypeMismatch`] if the field is not of type `T`.
    pub fn try_get<'a, T>(&'a self, name: &str) -> Result<T, TypeError>
    where
        T: TryFrom<&'a Value, Error = TypeError>,
    {
        let value = self
            .get_by_name(name)
            .ok_or_else(|| TypeError::ColumnNotFound(name.to_owned()))?;
        T::try_from(value)
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnDescriptor, &Value)> {
        self.columns.iter().zip(self.values.iter())
    }

    /// Get the fields as a slice.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row and return its fields.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// The complete typed output of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Arc<[ColumnDescriptor]>,
    rows: Vec<Row>,
    query_timeout: Option<String>,
    query_time: Option<String>,
}

impl ResultSet {
    pub(crate) fn new(
        columns: Arc<[ColumnDescriptor]>,
        rows: Vec<Row>,
        query_timeout: Option<String>,
        query_time: Option<String>,
    ) -> Self {
        Self {
            columns,
            rows,
            query_timeout,
            query_time,
        }
    }

    /// Get the column metadata, in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Find a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get the rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result set has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over every value of one column.
    ///
    /// Returns `None` if no column has this name.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row.values[index]))
    }

    /// The text after the `#QUERYTIMEOUT` marker, if any.
    #[must_use]
    pub fn query_timeout(&self) -> Option<&str> {
        self.query_timeout.as_deref()
    }

    /// The text after the `#QUERYTIME` marker, if any.
    #[must_use]
    pub fn query_time(&self) -> Option<&str> {
        self.query_time.as_deref()
    }

    /// Consume the result set and return its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// A documentation page: the raw lines of the response, unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocPage {
    lines: Vec<String>,
}

impl DocPage {
    /// Create a page from its lines.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Get the lines of the page.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the lines back into one newline-terminated text.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Consume the page and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl From<Vec<String>> for DocPage {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}
