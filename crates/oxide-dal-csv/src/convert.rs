//! Conversions between [`Value`] and DuckDB values.
//!
//! Sheets are loaded with every column as `VARCHAR`, so fetched cells are
//! mostly text. Computed columns keep DuckDB's types: integers that fit
//! become [`Value::Int`], wider ones and anything without a counterpart here
//! are rendered as text.

use duckdb::types::Value as DuckValue;
use oxide_dal_core::{BackendError, Value};

/// Converts a parameter value for binding.
pub fn to_duckdb(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Int(i) => DuckValue::BigInt(*i),
        Value::Float(f) => DuckValue::Double(*f),
        Value::Text(s) => DuckValue::Text(s.clone()),
        Value::Blob(b) => DuckValue::Blob(b.clone()),
    }
}

/// Converts a fetched cell.
pub fn from_duckdb(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::Int(i64::from(i)),
        DuckValue::SmallInt(i) => Value::Int(i64::from(i)),
        DuckValue::Int(i) => Value::Int(i64::from(i)),
        DuckValue::BigInt(i) => Value::Int(i),
        DuckValue::UTinyInt(i) => Value::Int(i64::from(i)),
        DuckValue::USmallInt(i) => Value::Int(i64::from(i)),
        DuckValue::UInt(i) => Value::Int(i64::from(i)),
        DuckValue::HugeInt(i) => {
            i64::try_from(i).map_or_else(|_| Value::Text(i.to_string()), Value::Int)
        }
        DuckValue::UBigInt(i) => {
            i64::try_from(i).map_or_else(|_| Value::Text(i.to_string()), Value::Int)
        }
        DuckValue::Float(f) => Value::Float(f64::from(f)),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Text(s) => Value::Text(s),
        DuckValue::Blob(b) => Value::Blob(b),
        other => Value::Text(format!("{other:?}")),
    }
}

/// Wraps a native error, keeping its message.
pub fn backend_error(err: duckdb::Error) -> BackendError {
    BackendError::from_source(err)
}
