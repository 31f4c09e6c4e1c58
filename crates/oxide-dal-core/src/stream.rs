//! Lazy, forward-only result streams.
//!
//! A [`RowStream`] owns one open cursor and fetches and maps exactly one
//! backend row per advance. The cursor is released the moment the stream is
//! exhausted, closed, or yields an error, and at the latest when the stream
//! is dropped, so early termination never leaks it.
//!
//! Streams are handed out by "visit, then auto-close" operations such as
//! [`Session::stream`](crate::Session::stream): the stream lives only for the
//! duration of the visitor, and the connection it borrows from is released
//! right after.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::Cursor;
use crate::error::{DalError, Result};
use crate::row::Row;

/// Lifecycle of a [`RowStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Cursor open and positioned before the first row.
    Created,
    /// At least one row has been fetched.
    Active,
    /// The cursor reported its last row; the cursor has been released.
    Exhausted,
    /// Closed by the consumer or by an error; the cursor has been released.
    Closed,
}

impl StreamState {
    /// Returns true for `Exhausted` and `Closed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Closed)
    }
}

/// A lazy, single-pass, non-restartable sequence of mapped rows.
///
/// Implements [`Iterator`] with `Result` items; once terminal it yields
/// `None` forever.
pub struct RowStream<'a, T> {
    cursor: Option<Box<dyn Cursor + 'a>>,
    columns: Arc<[String]>,
    map: Box<dyn FnMut(Row) -> T + 'a>,
    state: StreamState,
    fetched: usize,
}

impl<'a, T> RowStream<'a, T> {
    /// Wraps an open cursor; `map` turns each raw row into an item.
    pub fn new<M>(cursor: Box<dyn Cursor + 'a>, map: M) -> Self
    where
        M: FnMut(Row) -> T + 'a,
    {
        let columns: Arc<[String]> = cursor.columns().iter().cloned().collect();
        Self {
            cursor: Some(cursor),
            columns,
            map: Box::new(map),
            state: StreamState::Created,
            fetched: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Returns the result column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns how many rows have been produced so far.
    #[must_use]
    pub const fn fetched(&self) -> usize {
        self.fetched
    }

    /// Fetches and maps the next row.
    ///
    /// Returns `Ok(None)` once exhausted, and [`DalError::StreamClosed`] if
    /// the stream was closed before reaching the end.
    pub fn advance(&mut self) -> Result<Option<T>> {
        match self.state {
            StreamState::Exhausted => return Ok(None),
            StreamState::Closed => return Err(DalError::StreamClosed),
            StreamState::Created | StreamState::Active => {}
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(DalError::StreamClosed);
        };

        match cursor.advance() {
            Ok(Some(values)) => match Row::new(Arc::clone(&self.columns), values) {
                Ok(row) => {
                    self.state = StreamState::Active;
                    self.fetched += 1;
                    Ok(Some((self.map)(row)))
                }
                Err(err) => {
                    self.release(StreamState::Closed);
                    Err(err)
                }
            },
            Ok(None) => {
                self.release(StreamState::Exhausted);
                Ok(None)
            }
            Err(err) => {
                self.release(StreamState::Closed);
                Err(err.into())
            }
        }
    }

    /// Closes the stream, releasing the cursor if still held.
    ///
    /// Idempotent. No further rows are produced afterwards.
    pub fn close(&mut self) {
        self.release(StreamState::Closed);
    }

    fn release(&mut self, state: StreamState) {
        if self.cursor.take().is_some() {
            debug!(rows = self.fetched, ?state, "Released result cursor");
        }
        if !self.state.is_terminal() || state == StreamState::Closed {
            self.state = state;
        }
    }
}

impl<T> Iterator for RowStream<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        self.advance().transpose()
    }
}

impl<T> fmt::Debug for RowStream<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("columns", &self.columns)
            .field("state", &self.state)
            .field("fetched", &self.fetched)
            .finish_non_exhaustive()
    }
}
