#![allow(dead_code)]

use oxide_dal_core::{Database, Statement};
use tempfile::TempDir;

/// A database file in a temporary directory, removed on drop.
pub struct TempDatabase {
    pub db: Database,
    pub dir: TempDir,
}

/// Creates an empty database file.
pub fn empty() -> TempDatabase {
    let dir = tempfile::tempdir().unwrap();
    let db = oxide_dal_sqlite::create_file(dir.path().join("test.db"));
    TempDatabase { db, dir }
}

/// Creates `People (Id INTEGER, Name TEXT)` holding `(1, 'a')`, `(2, 'b')`.
pub fn people() -> TempDatabase {
    let temp = empty();
    run(&temp.db, "CREATE TABLE People (Id INTEGER, Name TEXT)");
    run(&temp.db, "INSERT INTO People VALUES (1, 'a'), (2, 'b')");
    temp
}

pub fn run(db: &Database, sql: &str) -> usize {
    db.execute_non_query(&Statement::new(sql)).unwrap()
}
