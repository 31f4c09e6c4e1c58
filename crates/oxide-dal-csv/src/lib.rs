//! # oxide-dal-csv
//!
//! Workbook backend for `oxide-dal-core`: a directory of CSV files queried
//! through an embedded DuckDB.
//!
//! # How a workbook maps onto the data access layer
//!
//! - **Sheets**: each `<name>.csv` in the directory is one table, listed and
//!   referenced as `<name>$`. [`Database::read_table`] and
//!   [`Database::write_table`] add the marker, so callers pass `<name>`.
//! - **Quoting**: identifiers are double-quoted, as in
//!   `SELECT * FROM "People$"`.
//! - **Types**: every cell loads as text; an empty cell loads as `Null`.
//! - **Parameters**: `@name`, `:name` and `$name` placeholders are rewritten
//!   to positional ones before DuckDB sees the statement.
//! - **Persistence**: each connection works on an in-memory copy. If any
//!   statement was executed, every table is written back to
//!   `<name>.csv` when the connection closes. Dropping a table does not
//!   delete its file.
//! - **`Mode=ReadOnly`**: executing any statement fails; queries work.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_dal_core::DataTable;
//!
//! let db = oxide_dal_csv::open_file("book/People.csv")?;
//! let people = db.read_table("People")?;
//! let copy = DataTable::new(people.columns().iter().map(String::as_str));
//! db.write_table("Archive", &copy)?;
//! # Ok::<(), oxide_dal_core::DalError>(())
//! ```

mod connection;
mod convert;
mod factory;
mod placeholders;

use std::path::Path;
use std::sync::Arc;

use oxide_dal_core::{
    ConnectionFactory, ConnectionParams, Database, OpenMode, ProviderRegistry, Result,
};

pub use connection::{CsvCommand, CsvConnection, CsvCursor, SHEET_MARKER};
pub use factory::CsvFactory;

/// Provider tag this backend registers under.
pub const PROVIDER: &str = "csv";

/// File extension of a sheet.
pub const EXTENSION: &str = "csv";

fn build(params: &ConnectionParams) -> Result<Arc<dyn ConnectionFactory>> {
    Ok(Arc::new(CsvFactory::from_params(params)?))
}

/// Registers the `csv` provider and its file extension.
pub fn register(registry: &mut ProviderRegistry) {
    registry.register(PROVIDER, build);
    registry.register_extension(EXTENSION, PROVIDER);
}

/// Returns a registry holding only this backend.
#[must_use]
pub fn registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    register(&mut registry);
    registry
}

/// Opens the workbook holding the sheet file `path`.
///
/// The sheet itself need not exist yet.
pub fn open_file(path: impl AsRef<Path>) -> Result<Database> {
    registry().open_file(path)
}

/// Opens an existing workbook directory.
#[must_use]
pub fn open_dir(path: impl AsRef<Path>) -> Database {
    Database::new(Arc::new(CsvFactory::new(path)))
}

/// Opens a workbook directory, creating it if missing.
#[must_use]
pub fn create_dir(path: impl AsRef<Path>) -> Database {
    Database::new(Arc::new(
        CsvFactory::new(path).with_mode(OpenMode::ReadWriteCreate),
    ))
}
