//! The connection, command and cursor levels over `rusqlite`.

use oxide_dal_core::{BackendError, Command, Connection, Cursor, Parameter, Value};
use rusqlite::{Rows, Statement};

use crate::convert::{backend_error, from_sqlite, to_sqlite};

/// User tables in catalog order; SQLite's internal tables are excluded.
const TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY rowid";

/// Placeholder sigils SQLite accepts for named parameters.
const SIGILS: [char; 3] = ['@', ':', '$'];

/// An open SQLite connection.
#[derive(Debug)]
pub struct SqliteConnection {
    connection: rusqlite::Connection,
}

impl SqliteConnection {
    pub(crate) const fn new(connection: rusqlite::Connection) -> Self {
        Self { connection }
    }
}

impl Connection for SqliteConnection {
    fn prepare<'c>(&'c mut self, text: &str) -> Result<Box<dyn Command + 'c>, BackendError> {
        let statement = self.connection.prepare(text).map_err(backend_error)?;
        Ok(Box::new(SqliteCommand { statement }))
    }

    fn table_names(&mut self) -> Result<Vec<String>, BackendError> {
        let mut statement = self.connection.prepare(TABLES_SQL).map_err(backend_error)?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(backend_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(backend_error)?;
        Ok(names)
    }

    fn close(self: Box<Self>) -> Result<(), BackendError> {
        let Self { connection } = *self;
        connection.close().map_err(|(_, err)| backend_error(err))
    }
}

/// A prepared statement.
///
/// Rows are streamed with `raw_query`, and each execute resets the statement
/// so it can be rebound and run again. Executing a statement that returns
/// rows (`PRAGMA journal_mode=WAL`, `INSERT ... RETURNING`) steps it to
/// completion, discards the rows and reports 0 affected rows.
pub struct SqliteCommand<'c> {
    statement: Statement<'c>,
}

impl SqliteCommand<'_> {
    /// Finds the 1-based index of a named placeholder.
    ///
    /// A name carrying a sigil is looked up as written; a bare name is tried
    /// with each sigil in turn.
    fn parameter_index(&self, name: &str) -> Result<usize, BackendError> {
        let candidates: Vec<String> = if name.starts_with(SIGILS) {
            vec![name.to_string()]
        } else {
            SIGILS.iter().map(|sigil| format!("{sigil}{name}")).collect()
        };
        for candidate in &candidates {
            if let Some(index) = self
                .statement
                .parameter_index(candidate)
                .map_err(backend_error)?
            {
                return Ok(index);
            }
        }
        Err(BackendError::new(format!("no such parameter: {name}")))
    }
}

impl Command for SqliteCommand<'_> {
    fn bind(&mut self, parameter: &Parameter) -> Result<(), BackendError> {
        let index = self.parameter_index(&parameter.name)?;
        self.statement
            .raw_bind_parameter(index, to_sqlite(&parameter.value))
            .map_err(backend_error)
    }

    fn execute(&mut self) -> Result<usize, BackendError> {
        if self.statement.column_count() == 0 {
            return self.statement.raw_execute().map_err(backend_error);
        }
        let mut rows = self.statement.raw_query();
        while rows.next().map_err(backend_error)?.is_some() {}
        Ok(0)
    }

    fn query<'s>(&'s mut self) -> Result<Box<dyn Cursor + 's>, BackendError> {
        let columns = self
            .statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        Ok(Box::new(SqliteCursor {
            columns,
            rows: self.statement.raw_query(),
        }))
    }
}

/// Forward-only cursor over a statement's rows.
///
/// Dropping it resets the statement.
pub struct SqliteCursor<'s> {
    columns: Vec<String>,
    rows: Rows<'s>,
}

impl Cursor for SqliteCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn advance(&mut self) -> Result<Option<Vec<Value>>, BackendError> {
        let width = self.columns.len();
        let Some(row) = self.rows.next().map_err(backend_error)? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(width);
        for index in 0..width {
            values.push(from_sqlite(row.get_ref(index).map_err(backend_error)?));
        }
        Ok(Some(values))
    }
}
