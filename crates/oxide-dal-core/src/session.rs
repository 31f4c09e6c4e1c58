//! A single open connection.
//!
//! A [`Session`] owns exactly one backend connection and releases it exactly
//! once: through [`Session::close`], or on drop if the caller never closed
//! it. Streams borrow the session mutably, so only one of them can be alive
//! at a time.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{Connection, ConnectionFactory};
use crate::diagnostics::DiagnosticSink;
use crate::error::{DalError, Result};
use crate::executor;
use crate::identifier;
use crate::introspect;
use crate::mapper::{FieldMap, Record, RowMapper};
use crate::row::{DataTable, Row};
use crate::sql;
use crate::statement::Statement;
use crate::stream::RowStream;
use crate::value::Value;
use crate::writer;

/// An open connection plus the factory and sink it came with.
pub struct Session {
    connection: Option<Box<dyn Connection>>,
    factory: Arc<dyn ConnectionFactory>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Session {
    /// Opens a new connection through `factory`.
    pub fn open(
        factory: Arc<dyn ConnectionFactory>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let connection = factory.connect()?;
        debug!(provider = %factory.name(), "Opened connection");
        Ok(Self {
            connection: Some(connection),
            factory,
            sink,
        })
    }

    fn connection(&mut self) -> Result<&mut dyn Connection> {
        match self.connection.as_deref_mut() {
            Some(connection) => Ok(connection),
            None => Err(DalError::ConnectionClosed),
        }
    }

    /// Returns the diagnostics sink.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    /// Executes a command, returning the affected row count.
    pub fn execute_non_query(&mut self, statement: &Statement) -> Result<usize> {
        executor::execute_non_query(self.connection()?, statement)
    }

    /// Returns the first column of the first row, or `None` without rows.
    pub fn execute_scalar(&mut self, statement: &Statement) -> Result<Option<Value>> {
        executor::execute_scalar(self.connection()?, statement)
    }

    /// Executes a query and buffers every row.
    pub fn execute_table(&mut self, statement: &Statement) -> Result<DataTable> {
        executor::execute_table(self.connection()?, statement)
    }

    /// Streams mapped records to `visit`, closing the stream afterwards.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let first_two = session.stream::<Person, _, _>(
    ///     &Statement::new("SELECT * FROM [People]"),
    ///     &FieldMap::new(),
    ///     |people| people.take(2).collect::<Result<Vec<_>>>(),
    /// )?;
    /// ```
    pub fn stream<T, R, F>(
        &mut self,
        statement: &Statement,
        field_map: &FieldMap,
        visit: F,
    ) -> Result<R>
    where
        T: Record,
        F: FnOnce(&mut RowStream<'_, T>) -> Result<R>,
    {
        let mapper = RowMapper::<T>::new(field_map.clone(), Arc::clone(&self.sink));
        executor::stream(
            self.connection()?,
            statement,
            move |row| mapper.map_row(&row),
            visit,
        )
    }

    /// Streams raw rows to `visit`, closing the stream afterwards.
    pub fn stream_rows<R, F>(&mut self, statement: &Statement, visit: F) -> Result<R>
    where
        F: FnOnce(&mut RowStream<'_, Row>) -> Result<R>,
    {
        executor::stream(self.connection()?, statement, |row| row, visit)
    }

    /// Maps every row of a query into records.
    pub fn query_collection<T: Record>(
        &mut self,
        statement: &Statement,
        field_map: &FieldMap,
    ) -> Result<Vec<T>> {
        self.stream(statement, field_map, |records| records.collect())
    }

    /// Returns the first column of every row, rendered as text.
    pub fn query_strings(&mut self, statement: &Statement) -> Result<Vec<String>> {
        executor::stream(
            self.connection()?,
            statement,
            |row| row.get_index(0).map(Value::render).unwrap_or_default(),
            |strings| strings.collect(),
        )
    }

    /// Reads a whole table with `SELECT * FROM <table>`, the name quoted the
    /// backend's way.
    pub fn read_table(&mut self, table: &str) -> Result<DataTable> {
        identifier::require_valid(table)?;
        let target = self.factory.table_reference(table);
        identifier::require_valid(&target)?;
        let quoted = self.factory.quote_identifier(&target);
        self.execute_table(&Statement::new(sql::select_all(&quoted)))
    }

    /// Lists table names in catalog order.
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        introspect::list_tables(self.connection()?)
    }

    /// Returns the `index`-th table name of [`Session::list_tables`].
    pub fn table_at(&mut self, index: usize) -> Result<String> {
        introspect::table_at(self.connection()?, index)
    }

    /// Returns true if the table exists.
    pub fn table_exists(&mut self, name: &str) -> Result<bool> {
        introspect::table_exists(self.connection()?, name)
    }

    /// Writes `data` into `table`, creating the table if it does not exist.
    pub fn write_table(&mut self, table: &str, data: &DataTable) -> Result<usize> {
        let factory = Arc::clone(&self.factory);
        let sink = Arc::clone(&self.sink);
        writer::write_table(
            self.connection()?,
            factory.as_ref(),
            sink.as_ref(),
            table,
            data,
        )
    }

    /// Releases the connection, reporting a failure to close.
    pub fn close(mut self) -> Result<()> {
        match self.connection.take() {
            Some(connection) => {
                connection.close()?;
                debug!(provider = %self.factory.name(), "Closed connection");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            match connection.close() {
                Ok(()) => debug!(provider = %self.factory.name(), "Closed connection"),
                Err(err) => warn!(
                    provider = %self.factory.name(),
                    error = %err,
                    "Failed to close connection"
                ),
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.factory.name())
            .field("open", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}
