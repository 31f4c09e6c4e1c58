//! Rows and fully materialized tables.

use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{DalError, Result};
use crate::value::Value;

/// A single result row: an ordered mapping from column name to value.
///
/// All rows of one result share the same column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row. The value count must match the column count.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(DalError::RowWidth {
                expected: columns.len(),
                found: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row, returning its values.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given ordinal.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the ordinal of a column.
    ///
    /// Exact match wins; otherwise the first ASCII case-insensitive match.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column))
            })
    }

    /// Returns the value of a column, or `None` if the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|i| &self.values[i])
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A fully materialized tabular result.
///
/// The column set is fixed for the whole table. A `DataTable` returned by the
/// executor is detached from any connection; it is also the in-memory dataset
/// accepted by the schema-synchronizing writer.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl DataTable {
    /// Creates an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates an empty table sharing an existing column list.
    #[must_use]
    pub fn with_columns(columns: Arc<[String]>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row of values.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        let row = Row::new(Arc::clone(&self.columns), values)?;
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style variant of [`DataTable::push_row`].
    pub fn row(mut self, values: Vec<Value>) -> Result<Self> {
        self.push_row(values)?;
        Ok(self)
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl Serialize for DataTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
