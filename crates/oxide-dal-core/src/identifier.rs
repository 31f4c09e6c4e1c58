//! Identifier validation for generated statement text.
//!
//! Generated statements interpolate table and column names literally, so
//! every identifier taken from caller data passes through this module first:
//!
//! - table names go through [`validate`]; a failure aborts the operation with
//!   [`DalError::InvalidIdentifier`] instead of rewriting the name, since a
//!   rewritten table name could target the wrong object;
//! - dataset column names go through [`sanitize`], which strips the unsafe
//!   characters so a single odd header does not abort a whole write.

use crate::error::{DalError, Result};

/// Characters that can break out of a bracketed identifier or a column list.
pub const FORBIDDEN: [char; 5] = ['\'', '"', ']', ',', ';'];

/// Returns false if `name` contains any forbidden character.
#[must_use]
pub fn validate(name: &str) -> bool {
    !name.contains(FORBIDDEN)
}

/// Validates a table name, returning it unchanged on success.
pub fn require_valid(name: &str) -> Result<&str> {
    if validate(name) {
        Ok(name)
    } else {
        Err(DalError::InvalidIdentifier(name.to_string()))
    }
}

/// Strips forbidden characters and spaces from `name`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && !FORBIDDEN.contains(c))
        .collect()
}
