//! # oxide-dal-sqlite
//!
//! SQLite backend for `oxide-dal-core`, built on `rusqlite` with a bundled
//! SQLite.
//!
//! # How SQLite maps onto the data access layer
//!
//! - **Named parameters**: placeholders may use `@name`, `:name` or `$name`.
//!   A parameter bound without a sigil matches any of them.
//! - **[Type affinity]**: tables created by the writer declare every column
//!   `TEXT` and receive text. Appending to an existing table binds each
//!   value with its own type: booleans as 0/1, blobs as blobs.
//! - **Catalog order**: tables are listed in `sqlite_master` order, which is
//!   creation order for a database that never dropped a table.
//! - **`:memory:`**: every connection is a new, empty database, so use a
//!   file when data must survive between operations.
//!
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_dal_core::Statement;
//!
//! let db = oxide_dal_sqlite::open_file("people.db")?;
//! let adults = db.query_strings(
//!     &Statement::new("SELECT Name FROM People WHERE Age >= @age").bind("age", 18),
//! )?;
//! # Ok::<(), oxide_dal_core::DalError>(())
//! ```

mod connection;
mod convert;
mod factory;

use std::path::Path;
use std::sync::Arc;

use oxide_dal_core::{ConnectionFactory, ConnectionParams, Database, ProviderRegistry, Result};

pub use connection::{SqliteCommand, SqliteConnection, SqliteCursor};
pub use factory::{SqliteFactory, BUSY_TIMEOUT, MEMORY};
pub use oxide_dal_core::config::MODE;
pub use oxide_dal_core::OpenMode;

/// Provider tag this backend registers under.
pub const PROVIDER: &str = "sqlite";

/// File extensions resolved to this backend.
pub const EXTENSIONS: [&str; 4] = ["db", "sqlite", "sqlite3", "db3"];

fn build(params: &ConnectionParams) -> Result<Arc<dyn ConnectionFactory>> {
    Ok(Arc::new(SqliteFactory::from_params(params)?))
}

/// Registers the `sqlite` provider and its file extensions.
pub fn register(registry: &mut ProviderRegistry) {
    registry.register(PROVIDER, build);
    for extension in EXTENSIONS {
        registry.register_extension(extension, PROVIDER);
    }
}

/// Returns a registry holding only this backend.
#[must_use]
pub fn registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    register(&mut registry);
    registry
}

/// Opens an existing SQLite database file.
pub fn open_file(path: impl AsRef<Path>) -> Result<Database> {
    registry().open_file(path)
}

/// Opens a SQLite database file, creating it if missing.
#[must_use]
pub fn create_file(path: impl AsRef<Path>) -> Database {
    Database::new(Arc::new(
        SqliteFactory::new(path).with_mode(OpenMode::ReadWriteCreate),
    ))
}
