//! Reflection-free row-to-record mapping.
//!
//! A [`Record`] lists its mappable fields and knows how to assign a
//! [`Value`] to each of them; `#[derive(Record)]` from `oxide-dal-derive`
//! writes both for a struct with named fields. Column renames are not
//! attributes on the struct: they are declared in a [`FieldMap`] passed to
//! the mapper at the call site.
//!
//! Mapping is best-effort and never fails per field:
//!
//! - column missing from the row: field left untouched;
//! - column present but null: field left untouched;
//! - coercion not representable: field left untouched and a warning is
//!   reported to the [`DiagnosticSink`].

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::diagnostics::{DiagnosticContext, DiagnosticSink, Severity};
use crate::error::ConversionError;
use crate::row::Row;
use crate::value::{FromValue, Value};

/// A caller-defined type whose fields are targets of row mapping.
///
/// # Example
///
/// ```rust
/// use oxide_dal_core::mapper::{assign, Record};
/// use oxide_dal_core::{ConversionError, Value};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     id: i64,
///     name: String,
/// }
///
/// impl Record for Person {
///     const FIELDS: &'static [&'static str] = &["id", "name"];
///
///     fn set_field(&mut self, field: &str, value: &Value) -> Result<(), ConversionError> {
///         match field {
///             "id" => assign(&mut self.id, value),
///             "name" => assign(&mut self.name, value),
///             _ => Ok(()),
///         }
///     }
/// }
/// ```
pub trait Record: Default {
    /// Names of the mappable fields, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Coerces `value` into the named field.
    ///
    /// Unknown field names are ignored.
    fn set_field(&mut self, field: &str, value: &Value) -> Result<(), ConversionError>;
}

/// Coerces `value` and stores it in `slot`; on failure `slot` is unchanged.
pub fn assign<T: FromValue>(slot: &mut T, value: &Value) -> Result<(), ConversionError> {
    *slot = T::from_value(value)?;
    Ok(())
}

/// Explicit field name to source column name overrides.
///
/// Fields without an entry are looked up under their own name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    renames: HashMap<String, String>,
}

impl FieldMap {
    /// Creates an empty map (every field maps to its own name).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `field` to `column`.
    #[must_use]
    pub fn rename(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.renames.insert(field.into(), column.into());
        self
    }

    /// Returns the source column for a field.
    #[must_use]
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.renames.get(field).map_or(field, String::as_str)
    }
}

impl<F, C> FromIterator<(F, C)> for FieldMap
where
    F: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        Self {
            renames: iter
                .into_iter()
                .map(|(f, c)| (f.into(), c.into()))
                .collect(),
        }
    }
}

/// Maps one row into a new `T`.
pub fn map_row<T: Record>(row: &Row, field_map: &FieldMap, sink: &dyn DiagnosticSink) -> T {
    let mut record = T::default();
    for field in T::FIELDS {
        let column = field_map.column_for(field);
        let Some(value) = row.get(column) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let Err(err) = record.set_field(field, value) {
            let context = DiagnosticContext::new()
                .with("field", field)
                .with("column", column)
                .with("value", value.kind());
            sink.report(
                &format!("field mapping failed: {err}"),
                Severity::Warning,
                Some(&context),
            );
        }
    }
    record
}

/// Maps every row, preserving order.
pub fn map_all<'r, T, I>(rows: I, field_map: &FieldMap, sink: &dyn DiagnosticSink) -> Vec<T>
where
    T: Record,
    I: IntoIterator<Item = &'r Row>,
{
    rows.into_iter()
        .map(|row| map_row(row, field_map, sink))
        .collect()
}

/// A field map and a sink bundled for repeated use.
pub struct RowMapper<T> {
    field_map: FieldMap,
    sink: Arc<dyn DiagnosticSink>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> RowMapper<T> {
    /// Creates a mapper.
    pub fn new(field_map: FieldMap, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            field_map,
            sink,
            _marker: PhantomData,
        }
    }

    /// Returns the field map.
    #[must_use]
    pub const fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    /// Maps one row.
    #[must_use]
    pub fn map_row(&self, row: &Row) -> T {
        map_row(row, &self.field_map, self.sink.as_ref())
    }

    /// Maps every row, preserving order.
    pub fn map_all<'r, I>(&self, rows: I) -> Vec<T>
    where
        I: IntoIterator<Item = &'r Row>,
    {
        map_all(rows, &self.field_map, self.sink.as_ref())
    }
}

impl<T> Clone for RowMapper<T> {
    fn clone(&self) -> Self {
        Self {
            field_map: self.field_map.clone(),
            sink: Arc::clone(&self.sink),
            _marker: PhantomData,
        }
    }
}
