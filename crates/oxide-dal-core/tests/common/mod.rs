#![allow(dead_code)]

//! In-memory fake backend that counts connection and cursor lifecycles.
//!
//! It understands exactly the statement shapes the crate generates
//! (`SELECT * FROM [t]`, `CREATE TABLE [t] (...)`, `INSERT INTO [t](...)`)
//! plus `SELECT COUNT(*) FROM [t]`, `DELETE FROM [t]` and `SELECT NULL`.
//! Anything else fails with a backend error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use oxide_dal_core::{
    BackendError, Command, Connection, ConnectionFactory, Cursor, Database, DataTable, Parameter,
    Value,
};

#[derive(Debug, Clone)]
pub struct FakeTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub opens: usize,
    pub closes: usize,
    pub cursors_opened: usize,
    pub cursors_released: usize,
    pub statements: Vec<String>,
    pub tables: Vec<FakeTable>,
    /// Executed statements starting with this prefix fail.
    pub rejected_prefix: Option<String>,
    /// Inserts after this many successful ones fail.
    pub insert_limit: Option<usize>,
    pub inserts: usize,
}

impl FakeState {
    fn table_mut(&mut self, name: &str) -> Result<&mut FakeTable, BackendError> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| BackendError::new(format!("no such table: {name}")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    table_suffix: Option<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `suffix` to every table name used in statement text.
    pub fn with_table_suffix(mut self, suffix: &str) -> Self {
        self.table_suffix = Some(suffix.to_string());
        self
    }

    pub fn with_table(self, name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        self.state().tables.push(FakeTable {
            name: name.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
            rows,
        });
        self
    }

    /// Fails every executed statement that starts with `prefix`.
    pub fn rejecting(self, prefix: &str) -> Self {
        self.state().rejected_prefix = Some(prefix.to_string());
        self
    }

    /// Fails every insert after the first `limit`.
    pub fn with_insert_limit(self, limit: usize) -> Self {
        self.state().insert_limit = Some(limit);
        self
    }

    pub fn database(&self) -> Database {
        Database::new(Arc::new(self.clone()))
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn opens(&self) -> usize {
        self.state().opens
    }

    pub fn closes(&self) -> usize {
        self.state().closes
    }

    pub fn cursors_released(&self) -> usize {
        self.state().cursors_released
    }

    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn table(&self, name: &str) -> Option<FakeTable> {
        self.state()
            .tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
    }
}

impl ConnectionFactory for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn connect(&self) -> Result<Box<dyn Connection>, BackendError> {
        self.state().opens += 1;
        Ok(Box::new(FakeConnection {
            state: Arc::clone(&self.state),
        }))
    }

    fn table_reference(&self, table: &str) -> String {
        match &self.table_suffix {
            Some(suffix) => format!("{table}{suffix}"),
            None => table.to_string(),
        }
    }
}

struct FakeConnection {
    state: Arc<Mutex<FakeState>>,
}

impl Connection for FakeConnection {
    fn prepare<'c>(&'c mut self, text: &str) -> Result<Box<dyn Command + 'c>, BackendError> {
        Ok(Box::new(FakeCommand {
            state: &self.state,
            text: text.to_string(),
            bound: HashMap::new(),
        }))
    }

    fn table_names(&mut self) -> Result<Vec<String>, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(state.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn close(self: Box<Self>) -> Result<(), BackendError> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

struct FakeCommand<'c> {
    state: &'c Mutex<FakeState>,
    text: String,
    bound: HashMap<String, Value>,
}

/// Text between the first `[` and the following `]`.
fn bracketed(text: &str) -> Option<&str> {
    let start = text.find('[')? + 1;
    let end = start + text[start..].find(']')?;
    Some(&text[start..end])
}

fn between<'t>(text: &'t str, open: &str, close: &str) -> Option<&'t str> {
    let start = text.find(open)? + open.len();
    let end = start + text[start..].find(close)?;
    Some(&text[start..end])
}

fn split_list(list: &str) -> Vec<String> {
    list.split(", ").map(ToString::to_string).collect()
}

fn unsupported(text: &str) -> BackendError {
    BackendError::new(format!("unsupported statement: {text}"))
}

impl Command for FakeCommand<'_> {
    fn bind(&mut self, parameter: &Parameter) -> Result<(), BackendError> {
        self.bound
            .insert(parameter.bare_name().to_string(), parameter.value.clone());
        Ok(())
    }

    fn execute(&mut self) -> Result<usize, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(self.text.clone());
        let text = self.text.as_str();
        if let Some(prefix) = &state.rejected_prefix {
            if text.starts_with(prefix.as_str()) {
                return Err(BackendError::new(format!("rejected: {text}")));
            }
        }
        let table = bracketed(text).ok_or_else(|| unsupported(text))?;

        if text.starts_with("CREATE TABLE ") {
            let columns = between(text, "] (", ")").ok_or_else(|| unsupported(text))?;
            let columns = split_list(columns)
                .into_iter()
                .map(|c| c.trim_end_matches(" TEXT").to_string())
                .collect();
            state.tables.push(FakeTable {
                name: table.to_string(),
                columns,
                rows: Vec::new(),
            });
            Ok(0)
        } else if text.starts_with("INSERT INTO ") {
            if state.insert_limit.is_some_and(|limit| state.inserts >= limit) {
                return Err(BackendError::new("constraint failed"));
            }
            let columns = between(text, "](", ") VALUES").ok_or_else(|| unsupported(text))?;
            let columns = split_list(columns);
            let target = state.table_mut(table)?;
            let mut row = vec![Value::Null; target.columns.len()];
            for column in &columns {
                let value = self
                    .bound
                    .get(column)
                    .ok_or_else(|| BackendError::new(format!("missing parameter @{column}")))?;
                let index = target
                    .columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column))
                    .ok_or_else(|| BackendError::new(format!("no column named {column}")))?;
                row[index] = value.clone();
            }
            target.rows.push(row);
            state.inserts += 1;
            Ok(1)
        } else if text.starts_with("DELETE FROM ") {
            let target = state.table_mut(table)?;
            let count = target.rows.len();
            target.rows.clear();
            Ok(count)
        } else {
            Err(unsupported(text))
        }
    }

    fn query<'s>(&'s mut self) -> Result<Box<dyn Cursor + 's>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(self.text.clone());
        let text = self.text.as_str();

        let (columns, rows) = if text == "SELECT NULL" {
            (vec!["NULL".to_string()], vec![vec![Value::Null]])
        } else if text.starts_with("SELECT COUNT(*) FROM ") {
            let table = bracketed(text).ok_or_else(|| unsupported(text))?;
            let count = state.table_mut(table)?.rows.len();
            let count = i64::try_from(count).unwrap();
            (vec!["COUNT(*)".to_string()], vec![vec![Value::Int(count)]])
        } else if text.starts_with("SELECT * FROM ") {
            let table = bracketed(text).ok_or_else(|| unsupported(text))?;
            let target = state.table_mut(table)?;
            (target.columns.clone(), target.rows.clone())
        } else {
            return Err(unsupported(text));
        };

        state.cursors_opened += 1;
        Ok(Box::new(FakeCursor {
            state: self.state,
            columns,
            rows: rows.into_iter(),
        }))
    }
}

struct FakeCursor<'s> {
    state: &'s Mutex<FakeState>,
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Cursor for FakeCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn advance(&mut self) -> Result<Option<Vec<Value>>, BackendError> {
        Ok(self.rows.next())
    }
}

impl Drop for FakeCursor<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.cursors_released += 1;
        }
    }
}

/// `People (Id, Name)` with rows `(1, "a")`, `(2, "b")`.
pub fn people() -> FakeBackend {
    FakeBackend::new().with_table(
        "People",
        &["Id", "Name"],
        vec![
            vec![Value::Int(1), Value::Text("a".into())],
            vec![Value::Int(2), Value::Text("b".into())],
        ],
    )
}

/// `Numbers (N)` with rows `1..=n`.
pub fn numbers(n: i64) -> FakeBackend {
    FakeBackend::new().with_table(
        "Numbers",
        &["N"],
        (1..=n).map(|i| vec![Value::Int(i)]).collect(),
    )
}

pub fn table_of(columns: &[&str], rows: Vec<Vec<Value>>) -> DataTable {
    rows.into_iter()
        .fold(DataTable::new(columns.iter().copied()), |table, row| {
            table.row(row).unwrap()
        })
}
