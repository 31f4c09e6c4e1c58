//! SQLite connection factory and its connection-string options.

use std::path::{Path, PathBuf};
use std::time::Duration;

use oxide_dal_core::{
    BackendError, Connection, ConnectionFactory, ConnectionParams, ConnectionString, DalError,
    OpenMode, Result,
};
use rusqlite::OpenFlags;
use tracing::debug;

use crate::connection::SqliteConnection;
use crate::convert::backend_error;

/// Connection-string key for the busy timeout, in milliseconds.
pub const BUSY_TIMEOUT: &str = "Busy Timeout";

/// Data source naming a private in-memory database.
pub const MEMORY: &str = ":memory:";

fn open_flags(mode: OpenMode) -> OpenFlags {
    let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    match mode {
        OpenMode::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
        OpenMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
        OpenMode::ReadWriteCreate => {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        }
    }
}

/// Opens SQLite connections to one database file.
///
/// Every [`connect`](ConnectionFactory::connect) opens a new handle, so a
/// `:memory:` factory hands out a fresh, empty database each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteFactory {
    path: PathBuf,
    mode: OpenMode,
    busy_timeout: Option<Duration>,
}

impl SqliteFactory {
    /// Creates a factory for a database file opened read-write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode: OpenMode::default(),
            busy_timeout: None,
        }
    }

    /// Sets the open mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets how long a connection waits on a locked database.
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Builds a factory from a parsed connection string.
    ///
    /// Recognized keys: `Data Source` (required), `Mode` and `Busy Timeout`.
    /// Other keys are ignored.
    pub fn from_connection_string(connection_string: &ConnectionString) -> Result<Self> {
        let data_source = connection_string
            .data_source()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DalError::InvalidConnectionString("missing Data Source".to_string())
            })?;
        let mode = OpenMode::from_connection_string(connection_string)?;
        let mut factory = Self::new(data_source).with_mode(mode);
        if let Some(timeout) = connection_string.get(BUSY_TIMEOUT) {
            let millis: u64 = timeout.parse().map_err(|_| {
                DalError::InvalidConnectionString(format!(
                    "{BUSY_TIMEOUT} must be a number of milliseconds, got '{timeout}'"
                ))
            })?;
            factory = factory.with_busy_timeout(Duration::from_millis(millis));
        }
        Ok(factory)
    }

    /// Builds a factory from connection params.
    pub fn from_params(params: &ConnectionParams) -> Result<Self> {
        Self::from_connection_string(&params.parsed()?)
    }

    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the open mode.
    #[must_use]
    pub const fn mode(&self) -> OpenMode {
        self.mode
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY
    }

    fn open(&self) -> rusqlite::Result<rusqlite::Connection> {
        let connection = if self.is_memory() {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open_with_flags(&self.path, open_flags(self.mode))?
        };
        if let Some(timeout) = self.busy_timeout {
            connection.busy_timeout(timeout)?;
        }
        Ok(connection)
    }
}

impl ConnectionFactory for SqliteFactory {
    fn name(&self) -> &str {
        crate::PROVIDER
    }

    fn connect(&self) -> std::result::Result<Box<dyn Connection>, BackendError> {
        let connection = self.open().map_err(backend_error)?;
        debug!(path = %self.path.display(), mode = %self.mode, "Opened SQLite database");
        Ok(Box::new(SqliteConnection::new(connection)))
    }
}
