//! Database handle.
//!
//! A [`Database`] is a connection factory plus a diagnostics sink. It never
//! holds a connection: every call opens a fresh [`Session`], runs, and
//! releases it before returning.

use std::fmt;
use std::sync::Arc;

use crate::backend::ConnectionFactory;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::mapper::{FieldMap, Record};
use crate::row::{DataTable, Row};
use crate::session::Session;
use crate::statement::Statement;
use crate::stream::RowStream;
use crate::value::Value;

/// Handle to one configured backend.
///
/// Cheap to clone; clones share the factory and sink.
///
/// # Example
///
/// ```rust,ignore
/// use oxide_dal_core::{Database, Statement};
///
/// let db = oxide_dal_sqlite::open_file("people.db")?;
/// let count = db.execute_scalar(&Statement::new("SELECT COUNT(*) FROM [People]"))?;
/// let people = db.read_table("People")?;
/// ```
#[derive(Clone)]
pub struct Database {
    factory: Arc<dyn ConnectionFactory>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Database {
    /// Creates a handle reporting diagnostics through `tracing`.
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the diagnostics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the connection factory.
    #[must_use]
    pub fn factory(&self) -> &Arc<dyn ConnectionFactory> {
        &self.factory
    }

    /// Returns the diagnostics sink.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    /// Opens a session on a new connection.
    pub fn session(&self) -> Result<Session> {
        Session::open(Arc::clone(&self.factory), Arc::clone(&self.sink))
    }

    /// Runs `f` on a fresh session and closes it.
    ///
    /// If `f` fails, its error is returned and the connection is still
    /// released.
    pub fn with_session<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Session) -> Result<R>,
    {
        let mut session = self.session()?;
        let value = f(&mut session)?;
        session.close()?;
        Ok(value)
    }

    /// Executes a command, returning the affected row count.
    pub fn execute_non_query(&self, statement: &Statement) -> Result<usize> {
        self.with_session(|s| s.execute_non_query(statement))
    }

    /// Returns the first column of the first row, or `None` without rows.
    pub fn execute_scalar(&self, statement: &Statement) -> Result<Option<Value>> {
        self.with_session(|s| s.execute_scalar(statement))
    }

    /// Executes a query and buffers every row.
    pub fn execute_table(&self, statement: &Statement) -> Result<DataTable> {
        self.with_session(|s| s.execute_table(statement))
    }

    /// Streams mapped records to `visit`; the connection is released after.
    pub fn stream<T, R, F>(
        &self,
        statement: &Statement,
        field_map: &FieldMap,
        visit: F,
    ) -> Result<R>
    where
        T: Record,
        F: FnOnce(&mut RowStream<'_, T>) -> Result<R>,
    {
        self.with_session(|s| s.stream(statement, field_map, visit))
    }

    /// Streams raw rows to `visit`; the connection is released after.
    pub fn stream_rows<R, F>(&self, statement: &Statement, visit: F) -> Result<R>
    where
        F: FnOnce(&mut RowStream<'_, Row>) -> Result<R>,
    {
        self.with_session(|s| s.stream_rows(statement, visit))
    }

    /// Maps every row of a query into records.
    pub fn query_collection<T: Record>(
        &self,
        statement: &Statement,
        field_map: &FieldMap,
    ) -> Result<Vec<T>> {
        self.with_session(|s| s.query_collection(statement, field_map))
    }

    /// Returns the first column of every row, rendered as text.
    pub fn query_strings(&self, statement: &Statement) -> Result<Vec<String>> {
        self.with_session(|s| s.query_strings(statement))
    }

    /// Reads a whole table.
    pub fn read_table(&self, table: &str) -> Result<DataTable> {
        self.with_session(|s| s.read_table(table))
    }

    /// Lists table names in catalog order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.with_session(Session::list_tables)
    }

    /// Returns the `index`-th table name.
    pub fn table_at(&self, index: usize) -> Result<String> {
        self.with_session(|s| s.table_at(index))
    }

    /// Returns true if the table exists.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        self.with_session(|s| s.table_exists(name))
    }

    /// Writes `data` into `table`, creating the table if it does not exist.
    pub fn write_table(&self, table: &str, data: &DataTable) -> Result<usize> {
        self.with_session(|s| s.write_table(table, data))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("provider", &self.factory.name())
            .finish_non_exhaustive()
    }
}
