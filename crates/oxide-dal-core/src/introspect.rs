//! Table catalog introspection.
//!
//! Listing order is whatever the backend catalog reports. It is stable for
//! one open connection but otherwise unspecified, so ordinal addressing via
//! [`table_at`] is only meaningful within a single session.

use crate::backend::Connection;
use crate::error::{DalError, Result};

/// Lists table names in catalog order.
pub fn list_tables(connection: &mut dyn Connection) -> Result<Vec<String>> {
    Ok(connection.table_names()?)
}

/// Returns the `index`-th table name (0-based).
pub fn table_at(connection: &mut dyn Connection, index: usize) -> Result<String> {
    let tables = list_tables(connection)?;
    let count = tables.len();
    tables
        .into_iter()
        .nth(index)
        .ok_or(DalError::IndexOutOfRange { index, count })
}

/// Returns true if a table with this name exists.
///
/// Names are compared ASCII case-insensitively, the way bracketed
/// identifiers resolve in the wrapped backends.
pub fn table_exists(connection: &mut dyn Connection, name: &str) -> Result<bool> {
    Ok(list_tables(connection)?
        .iter()
        .any(|t| t.eq_ignore_ascii_case(name)))
}
