//! Statement execution on an open connection.
//!
//! Every operation prepares the statement text, binds parameters in the
//! order supplied, executes, and shapes the result. Backend failures are
//! propagated as [`DalError::Backend`](crate::DalError::Backend) with the
//! native message; nothing is retried.

use tracing::debug;

use crate::backend::{Command, Connection};
use crate::error::Result;
use crate::row::{DataTable, Row};
use crate::statement::Statement;
use crate::stream::RowStream;
use crate::value::Value;

/// Prepares a statement and binds its parameters.
pub fn prepare<'c>(
    connection: &'c mut dyn Connection,
    statement: &Statement,
) -> Result<Box<dyn Command + 'c>> {
    debug!(
        sql = %statement.text(),
        parameters = statement.parameters().len(),
        "Executing statement"
    );
    let mut command = connection.prepare(statement.text())?;
    for parameter in statement.parameters() {
        command.bind(parameter)?;
    }
    Ok(command)
}

/// Executes a command, returning the affected row count.
pub fn execute_non_query(connection: &mut dyn Connection, statement: &Statement) -> Result<usize> {
    let mut command = prepare(connection, statement)?;
    Ok(command.execute()?)
}

/// Executes a query, returning the first column of the first row.
///
/// `None` means the query produced no rows; a null cell is `Some(Value::Null)`.
pub fn execute_scalar(
    connection: &mut dyn Connection,
    statement: &Statement,
) -> Result<Option<Value>> {
    let mut command = prepare(connection, statement)?;
    let mut cursor = command.query()?;
    let first = cursor.advance()?;
    Ok(first.and_then(|values| values.into_iter().next()))
}

/// Executes a query and buffers every row.
pub fn execute_table(connection: &mut dyn Connection, statement: &Statement) -> Result<DataTable> {
    let mut command = prepare(connection, statement)?;
    let mut cursor = command.query()?;
    let mut table = DataTable::new(cursor.columns().iter().cloned());
    while let Some(values) = cursor.advance()? {
        table.push_row(values)?;
    }
    debug!(rows = table.len(), "Buffered result table");
    Ok(table)
}

/// Executes a query and hands a lazy stream of mapped rows to `visit`.
///
/// The stream is closed when `visit` returns, whether or not it consumed
/// every row.
pub fn stream<T, R, M, F>(
    connection: &mut dyn Connection,
    statement: &Statement,
    map: M,
    visit: F,
) -> Result<R>
where
    M: FnMut(Row) -> T,
    F: FnOnce(&mut RowStream<'_, T>) -> Result<R>,
{
    let mut command = prepare(connection, statement)?;
    let cursor = command.query()?;
    let mut rows = RowStream::new(cursor, map);
    let result = visit(&mut rows);
    rows.close();
    result
}
