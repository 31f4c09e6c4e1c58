//! Non-fatal diagnostics.
//!
//! The core reports recoverable problems (a column that could not be coerced
//! into a record field) to a [`DiagnosticSink`] and carries on. The sink is
//! passed in explicitly; [`TracingSink`] is the default used by
//! [`Database`](crate::Database).

use std::fmt;
use std::sync::Mutex;

use tracing::{error, info, warn};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational.
    Info,
    /// Recovered problem.
    Warning,
    /// Failure.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Ordered key/value pairs attached to a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    entries: Vec<(String, String)>,
}

impl DiagnosticContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.entries.push((key.into(), value.to_string()));
        self
    }

    /// Returns the value of the first entry with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Receives non-fatal diagnostics.
///
/// The core never depends on anything the sink does.
pub trait DiagnosticSink: Send + Sync {
    /// Reports a diagnostic.
    fn report(&self, message: &str, severity: Severity, context: Option<&DiagnosticContext>);
}

/// Forwards diagnostics to `tracing` events of the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str, severity: Severity, context: Option<&DiagnosticContext>) {
        let context = context.map(ToString::to_string).unwrap_or_default();
        match severity {
            Severity::Info => info!(context = %context, "{message}"),
            Severity::Warning => warn!(context = %context, "{message}"),
            Severity::Error => error!(context = %context, "{message}"),
        }
    }
}

/// A diagnostic captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Message text.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Attached context, if any.
    pub context: Option<DiagnosticContext>,
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything reported so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Returns the number of diagnostics reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, message: &str, severity: Severity, context: Option<&DiagnosticContext>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Diagnostic {
                message: message.to_string(),
                severity,
                context: context.cloned(),
            });
        }
    }
}
