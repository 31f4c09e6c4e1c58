//! The connection, command and cursor levels over an in-memory DuckDB.
//!
//! A connection loads every sheet of the workbook into its own DuckDB
//! database when it opens. If any statement was executed, every table is
//! written back to `<root>/<sheet>.csv` when it closes.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use duckdb::types::Value as DuckValue;
use duckdb::{params_from_iter, Rows, Statement};
use oxide_dal_core::{identifier, BackendError, Command, Connection, Cursor, Parameter, Value};
use tracing::debug;

use crate::convert::{backend_error, from_duckdb, to_duckdb};
use crate::placeholders;

/// User tables in creation order.
const TABLES_SQL: &str = "SELECT table_name FROM duckdb_tables() \
     WHERE schema_name = 'main' AND NOT internal \
     ORDER BY table_oid";

/// Suffix marking a table that is backed by a sheet file.
pub const SHEET_MARKER: char = '$';

/// Single-quoted SQL string literal.
fn literal(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

/// Sheet files of a workbook, sorted by name.
///
/// A file whose stem is not a valid identifier cannot be referenced in
/// statement text and is skipped.
fn sheet_files(root: &Path) -> Result<Vec<(String, PathBuf)>, BackendError> {
    let mut sheets = Vec::new();
    for entry in fs::read_dir(root).map_err(BackendError::from_source)? {
        let path = entry.map_err(BackendError::from_source)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(crate::EXTENSION));
        if !is_csv || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if identifier::validate(stem) {
            sheets.push((stem.to_string(), path));
        } else {
            debug!(path = %path.display(), "Skipping sheet with an unusable name");
        }
    }
    sheets.sort();
    Ok(sheets)
}

/// An open workbook.
pub struct CsvConnection {
    connection: duckdb::Connection,
    root: PathBuf,
    read_only: bool,
    dirty: Cell<bool>,
}

impl CsvConnection {
    /// Opens an in-memory database holding every sheet under `root`.
    pub(crate) fn open(root: &Path, read_only: bool) -> Result<Self, BackendError> {
        let connection = duckdb::Connection::open_in_memory().map_err(backend_error)?;
        for (sheet, path) in sheet_files(root)? {
            let load = format!(
                "CREATE TABLE \"{sheet}{SHEET_MARKER}\" AS \
                 SELECT * FROM read_csv({}, header = true, all_varchar = true)",
                literal(&path)
            );
            connection.execute_batch(&load).map_err(backend_error)?;
            debug!(sheet = %sheet, path = %path.display(), "Loaded sheet");
        }
        Ok(Self {
            connection,
            root: root.to_path_buf(),
            read_only,
            dirty: Cell::new(false),
        })
    }

    /// Writes every table back to its sheet file.
    fn save(&mut self) -> Result<(), BackendError> {
        for table in self.table_names()? {
            let sheet = table.strip_suffix(SHEET_MARKER).unwrap_or(&table);
            let path = self.root.join(format!("{sheet}.{}", crate::EXTENSION));
            self.connection
                .execute_batch(&format!(
                    "COPY \"{table}\" TO {} (HEADER, DELIMITER ',')",
                    literal(&path)
                ))
                .map_err(backend_error)?;
            debug!(sheet = %sheet, path = %path.display(), "Saved sheet");
        }
        Ok(())
    }
}

impl Connection for CsvConnection {
    fn prepare<'c>(&'c mut self, text: &str) -> Result<Box<dyn Command + 'c>, BackendError> {
        let rewritten = placeholders::rewrite(text);
        let statement = self
            .connection
            .prepare(&rewritten.text)
            .map_err(backend_error)?;
        let values = vec![DuckValue::Null; rewritten.names.len()];
        Ok(Box::new(CsvCommand {
            statement,
            names: rewritten.names,
            values,
            dirty: &self.dirty,
            read_only: self.read_only,
        }))
    }

    fn table_names(&mut self) -> Result<Vec<String>, BackendError> {
        let mut statement = self.connection.prepare(TABLES_SQL).map_err(backend_error)?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(backend_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(backend_error)?;
        Ok(names)
    }

    fn close(mut self: Box<Self>) -> Result<(), BackendError> {
        if self.dirty.get() {
            self.save()?;
        }
        let Self { connection, .. } = *self;
        connection.close().map_err(|(_, err)| backend_error(err))
    }
}

/// A prepared statement with its positional parameter slots.
pub struct CsvCommand<'c> {
    statement: Statement<'c>,
    names: Vec<String>,
    values: Vec<DuckValue>,
    dirty: &'c Cell<bool>,
    read_only: bool,
}

impl Command for CsvCommand<'_> {
    fn bind(&mut self, parameter: &Parameter) -> Result<(), BackendError> {
        let name = parameter.bare_name();
        let mut found = false;
        for (slot, slot_name) in self.values.iter_mut().zip(&self.names) {
            if slot_name.eq_ignore_ascii_case(name) {
                *slot = to_duckdb(&parameter.value);
                found = true;
            }
        }
        if found {
            Ok(())
        } else {
            Err(BackendError::new(format!("no such parameter: {}", parameter.name)))
        }
    }

    fn execute(&mut self) -> Result<usize, BackendError> {
        if self.read_only {
            return Err(BackendError::new("workbook is opened read-only"));
        }
        let affected = self
            .statement
            .execute(params_from_iter(self.values.iter()))
            .map_err(backend_error)?;
        self.dirty.set(true);
        Ok(affected)
    }

    fn query<'s>(&'s mut self) -> Result<Box<dyn Cursor + 's>, BackendError> {
        self.statement
            .execute(params_from_iter(self.values.iter()))
            .map_err(backend_error)?;
        let columns = self.statement.column_names();
        Ok(Box::new(CsvCursor {
            columns,
            rows: self.statement.raw_query(),
        }))
    }
}

/// Forward-only cursor over a statement's rows.
pub struct CsvCursor<'s> {
    columns: Vec<String>,
    rows: Rows<'s>,
}

impl Cursor for CsvCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn advance(&mut self) -> Result<Option<Vec<Value>>, BackendError> {
        let width = self.columns.len();
        let Some(row) = self.rows.next().map_err(backend_error)? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(width);
        for index in 0..width {
            let value: DuckValue = row.get(index).map_err(backend_error)?;
            values.push(from_duckdb(value));
        }
        Ok(Some(values))
    }
}
