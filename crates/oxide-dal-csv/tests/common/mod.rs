#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use oxide_dal_core::{Database, Statement};
use tempfile::TempDir;

/// A workbook directory, removed on drop.
pub struct TempWorkbook {
    pub db: Database,
    pub dir: TempDir,
}

impl TempWorkbook {
    pub fn sheet(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{name}.csv"))
    }

    pub fn read_sheet(&self, name: &str) -> String {
        fs::read_to_string(self.sheet(name)).unwrap()
    }
}

/// Creates a workbook with no sheets.
pub fn empty() -> TempWorkbook {
    let dir = tempfile::tempdir().unwrap();
    let db = oxide_dal_csv::open_dir(dir.path());
    TempWorkbook { db, dir }
}

/// Creates a workbook holding `People.csv` with `(1, a)`, `(2, b)` and
/// `Orders.csv` with one row.
pub fn people() -> TempWorkbook {
    let temp = empty();
    fs::write(temp.sheet("People"), "Id,Name\n1,a\n2,b\n").unwrap();
    fs::write(temp.sheet("Orders"), "Id,Total\n10,4.5\n").unwrap();
    temp
}

pub fn run(db: &Database, sql: &str) -> usize {
    db.execute_non_query(&Statement::new(sql)).unwrap()
}
