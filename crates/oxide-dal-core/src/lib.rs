//! # oxide-dal-core
//!
//! Provider-agnostic data access over relational and tabular stores.
//!
//! This crate provides:
//! - Parameterized statement execution (non-query, scalar, buffered table)
//! - Lazy row streams that release their cursor on exhaustion, close or drop
//! - Reflection-free mapping of rows into caller-defined records
//! - Table introspection and a schema-synchronizing table writer
//!
//! Backends live in their own crates (see `oxide-dal-sqlite`) and plug in
//! through the [`backend`] traits and a [`ProviderRegistry`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_dal_core::{FieldMap, Statement};
//! use oxide_dal_derive::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//!
//! let db = oxide_dal_sqlite::open_file("people.db")?;
//! let people: Vec<Person> = db.query_collection(
//!     &Statement::new("SELECT Id, Name FROM [People] WHERE Id > @min").bind("min", 0),
//!     &FieldMap::new(),
//! )?;
//! ```

pub mod backend;
pub mod config;
pub mod database;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod introspect;
pub mod mapper;
pub mod row;
pub mod session;
pub mod sql;
pub mod statement;
pub mod stream;
pub mod value;
pub mod writer;

pub use backend::{Command, Connection, ConnectionFactory, Cursor};
pub use config::{ConnectionParams, ConnectionString, OpenMode, ProviderRegistry};
pub use database::Database;
pub use diagnostics::{DiagnosticContext, DiagnosticSink, MemorySink, Severity, TracingSink};
pub use error::{BackendError, ConversionError, DalError, Result};
pub use mapper::{FieldMap, Record, RowMapper};
pub use row::{DataTable, Row};
pub use session::Session;
pub use statement::{Parameter, Statement};
pub use stream::{RowStream, StreamState};
pub use value::{FromValue, IntoValue, Value};
