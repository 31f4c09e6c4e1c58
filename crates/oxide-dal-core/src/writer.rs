//! Schema-synchronizing table writer.
//!
//! Writes an in-memory [`DataTable`] into a backend table, creating the table
//! first when the catalog does not list it.
//!
//! - Created tables type every column as `TEXT`, and every non-null value
//!   is written as its text rendering. Non-finite floats have no portable
//!   text form: they are written as `Null` and reported to the sink.
//! - Tables that already existed receive the values unchanged, so the
//!   backend binds them with their own type (blobs stay blobs, booleans
//!   become the backend's boolean or integer).
//!
//! The existence check and the create/insert step are not atomic, and rows
//! are inserted one statement at a time without a surrounding transaction:
//! a failing `CREATE TABLE` runs no insert, and a failing insert stops the
//! write and leaves earlier rows in place.

use tracing::{debug, info};

use crate::backend::{Connection, ConnectionFactory};
use crate::diagnostics::{DiagnosticContext, DiagnosticSink, Severity};
use crate::error::{DalError, Result};
use crate::executor;
use crate::identifier;
use crate::introspect;
use crate::row::DataTable;
use crate::sql;
use crate::statement::{Parameter, Statement};
use crate::value::Value;

/// Writes `data` into `table`, creating it if needed.
///
/// Returns the total affected row count of the inserts.
pub fn write_table(
    connection: &mut dyn Connection,
    factory: &dyn ConnectionFactory,
    sink: &dyn DiagnosticSink,
    table: &str,
    data: &DataTable,
) -> Result<usize> {
    identifier::require_valid(table)?;
    let target = factory.table_reference(table);
    identifier::require_valid(&target)?;
    let quoted = factory.quote_identifier(&target);

    let columns = sanitized_columns(data)?;

    let created = if introspect::table_exists(connection, &target)? {
        debug!(table = %target, "Appending to existing table");
        false
    } else {
        executor::execute_non_query(
            connection,
            &Statement::new(sql::create_text_table(&quoted, &columns)),
        )?;
        info!(table = %target, columns = columns.len(), "Created table");
        true
    };

    let insert = Statement::new(sql::insert(&quoted, &columns));
    let mut command = executor::prepare(connection, &insert)?;
    let placeholders: Vec<String> = columns.iter().map(|c| sql::placeholder(c)).collect();

    let mut affected = 0;
    for row in data.rows() {
        let cells = placeholders.iter().zip(&columns).zip(row.values());
        for ((placeholder, column), value) in cells {
            let value = if created {
                text_cell(value, &target, column, sink)
            } else {
                value.clone()
            };
            command.bind(&Parameter::new(placeholder.as_str(), value))?;
        }
        affected += command.execute()?;
    }

    info!(table = %target, rows = affected, "Wrote rows");
    Ok(affected)
}

/// Renders a value for a `TEXT` column.
fn text_cell(value: &Value, table: &str, column: &str, sink: &dyn DiagnosticSink) -> Value {
    match value {
        Value::Float(x) if !x.is_finite() => {
            let context = DiagnosticContext::new()
                .with("table", table)
                .with("column", column)
                .with("value", x);
            sink.report(
                "non-finite float written as null",
                Severity::Warning,
                Some(&context),
            );
            Value::Null
        }
        other => other.stringify(),
    }
}

/// Sanitizes the dataset's column names.
///
/// A header that sanitizes to nothing cannot be written, and is reported
/// under its original spelling.
fn sanitized_columns(data: &DataTable) -> Result<Vec<String>> {
    data.columns()
        .iter()
        .map(|name| {
            let clean = identifier::sanitize(name);
            if clean.is_empty() {
                Err(DalError::InvalidIdentifier(name.clone()))
            } else {
                Ok(clean)
            }
        })
        .collect()
}
