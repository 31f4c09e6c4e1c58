//! Connection factory capability set.
//!
//! A backend is three small traits, one per level of the classic
//! connection/command/reader stack. Each level borrows the one above it, so
//! a cursor cannot outlive its command, a command cannot outlive its
//! connection, and a second cursor cannot be opened on a connection while
//! the first one is still alive.
//!
//! Backend crates (oxide-dal-sqlite, etc.) implement these traits; the core
//! only ever calls them.

use crate::error::BackendError;
use crate::statement::Parameter;
use crate::value::Value;

/// Opens connections to one configured backend.
pub trait ConnectionFactory: Send + Sync {
    /// Returns the provider name, used in logs.
    fn name(&self) -> &str;

    /// Opens a new connection.
    fn connect(&self) -> Result<Box<dyn Connection>, BackendError>;

    /// Maps a logical table name to the name used in statement text.
    ///
    /// Backends with a naming convention (for example a worksheet marker
    /// suffix) override this; the default is the identity.
    fn table_reference(&self, table: &str) -> String {
        table.to_string()
    }

    /// Quotes a validated identifier for statement text.
    ///
    /// The default is the bracket form `[name]`.
    fn quote_identifier(&self, name: &str) -> String {
        format!("[{name}]")
    }
}

/// An open connection.
pub trait Connection {
    /// Prepares a statement for execution.
    fn prepare<'c>(&'c mut self, text: &str) -> Result<Box<dyn Command + 'c>, BackendError>;

    /// Lists user table names in catalog order.
    fn table_names(&mut self) -> Result<Vec<String>, BackendError>;

    /// Releases the connection.
    fn close(self: Box<Self>) -> Result<(), BackendError>;
}

/// A prepared statement bound to a connection.
pub trait Command {
    /// Binds a parameter by name.
    fn bind(&mut self, parameter: &Parameter) -> Result<(), BackendError>;

    /// Executes the statement, returning the affected row count.
    fn execute(&mut self) -> Result<usize, BackendError>;

    /// Executes the statement and opens a cursor over its results.
    fn query<'s>(&'s mut self) -> Result<Box<dyn Cursor + 's>, BackendError>;
}

/// A forward-only cursor over a result set.
///
/// Dropping the cursor releases it.
pub trait Cursor {
    /// Returns the result column names.
    fn columns(&self) -> &[String];

    /// Fetches the next row, or `None` once the result is exhausted.
    fn advance(&mut self) -> Result<Option<Vec<Value>>, BackendError>;
}
