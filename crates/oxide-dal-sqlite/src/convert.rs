//! Conversions between [`Value`] and SQLite's storage classes.
//!
//! SQLite has five storage classes (NULL, INTEGER, REAL, TEXT, BLOB). Booleans
//! are bound as the integers 0 and 1, the way SQLite itself stores them.

use oxide_dal_core::{BackendError, Value};
use rusqlite::types::{Value as SqliteValue, ValueRef};

/// Converts a parameter value for binding.
pub fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Int(i) => SqliteValue::Integer(*i),
        Value::Float(f) => SqliteValue::Real(*f),
        Value::Text(s) => SqliteValue::Text(s.clone()),
        Value::Blob(b) => SqliteValue::Blob(b.clone()),
    }
}

/// Converts a fetched cell.
///
/// Text that is not valid UTF-8 is decoded lossily.
pub fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Wraps a native error, keeping its message.
pub fn backend_error(err: rusqlite::Error) -> BackendError {
    BackendError::from_source(err)
}
