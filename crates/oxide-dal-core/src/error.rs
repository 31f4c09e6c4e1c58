//! Error types for the data access layer.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// A failure reported by the underlying connection/statement layer.
///
/// Carries the backend's native message verbatim so callers can diagnose
/// connect failures, syntax errors and constraint violations without
/// re-running with tracing enabled.
#[derive(Debug)]
pub struct BackendError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl BackendError {
    /// Creates a backend error from a native message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a backend error wrapping the native error value.
    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the backend's native message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for BackendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Errors surfaced to callers of the data access layer.
#[derive(Debug, Error)]
pub enum DalError {
    /// No factory is registered for the requested provider or file type.
    #[error("unsupported format: '{0}'")]
    UnsupportedFormat(String),

    /// A table name failed identifier validation.
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Table enumeration by ordinal went past the end of the catalog.
    #[error("table index {index} is out of range ({count} tables)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of tables in the catalog.
        count: usize,
    },

    /// Failure from the backend, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A row did not match the column count of its table.
    #[error("row has {found} values but the table has {expected} columns")]
    RowWidth {
        /// Number of columns in the table.
        expected: usize,
        /// Number of values in the rejected row.
        found: usize,
    },

    /// A connection string could not be parsed.
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// The stream was already closed when a row was requested.
    #[error("result stream is closed")]
    StreamClosed,

    /// The session's connection was already released.
    #[error("connection is closed")]
    ConnectionClosed,
}

/// Result type alias for data access operations.
pub type Result<T> = std::result::Result<T, DalError>;

/// A single column-to-field coercion that could not be performed.
///
/// Never returned to callers of the mapper: the field is left at its default
/// value and the failure is reported to the diagnostics sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {value} to {target}")]
pub struct ConversionError {
    /// Debug rendering of the offending value.
    pub value: String,
    /// Name of the target type.
    pub target: &'static str,
}

impl ConversionError {
    /// Creates a conversion error for the given value and target type.
    pub fn new(value: &impl fmt::Debug, target: &'static str) -> Self {
        Self {
            value: format!("{value:?}"),
            target,
        }
    }
}
