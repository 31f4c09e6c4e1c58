//! Workbook connection factory.

use std::fs;
use std::path::{Path, PathBuf};

use oxide_dal_core::{
    BackendError, Connection, ConnectionFactory, ConnectionParams, ConnectionString, DalError,
    OpenMode, Result,
};
use tracing::debug;

use crate::connection::{CsvConnection, SHEET_MARKER};

/// Opens connections to one workbook: a directory of CSV sheets.
///
/// The data source is either the directory itself or any `.csv` file in
/// it; a file resolves to its parent directory, so every sibling sheet is
/// visible. Sheets are addressed as `<name>$` in statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFactory {
    root: PathBuf,
    mode: OpenMode,
}

impl CsvFactory {
    /// Creates a factory for the workbook holding `path`, opened read-write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let is_sheet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(crate::EXTENSION));
        let root = match path.parent() {
            Some(parent) if is_sheet && parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) if is_sheet => parent.to_path_buf(),
            _ => path.to_path_buf(),
        };
        Self {
            root,
            mode: OpenMode::default(),
        }
    }

    /// Sets the open mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builds a factory from a parsed connection string.
    ///
    /// Recognized keys: `Data Source` (required) and `Mode`.
    pub fn from_connection_string(connection_string: &ConnectionString) -> Result<Self> {
        let data_source = connection_string
            .data_source()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DalError::InvalidConnectionString("missing Data Source".to_string())
            })?;
        let mode = OpenMode::from_connection_string(connection_string)?;
        Ok(Self::new(data_source).with_mode(mode))
    }

    /// Builds a factory from connection params.
    pub fn from_params(params: &ConnectionParams) -> Result<Self> {
        Self::from_connection_string(&params.parsed()?)
    }

    /// Returns the workbook directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the open mode.
    #[must_use]
    pub const fn mode(&self) -> OpenMode {
        self.mode
    }
}

impl ConnectionFactory for CsvFactory {
    fn name(&self) -> &str {
        crate::PROVIDER
    }

    fn connect(&self) -> std::result::Result<Box<dyn Connection>, BackendError> {
        if !self.root.is_dir() {
            if self.mode != OpenMode::ReadWriteCreate {
                return Err(BackendError::new(format!(
                    "no such workbook: {}",
                    self.root.display()
                )));
            }
            fs::create_dir_all(&self.root).map_err(BackendError::from_source)?;
        }
        let connection = CsvConnection::open(&self.root, self.mode == OpenMode::ReadOnly)?;
        debug!(root = %self.root.display(), mode = %self.mode, "Opened workbook");
        Ok(Box::new(connection))
    }

    fn table_reference(&self, table: &str) -> String {
        format!("{table}{SHEET_MARKER}")
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{name}\"")
    }
}
