//! End-to-end tests against SQLite database files.

mod common;

use common::{empty, people, run};
use oxide_dal_core::{
    ConnectionParams, DalError, DataTable, FieldMap, Result, Statement, StreamState, Value,
};
use oxide_dal_derive::Record;

#[derive(Debug, Default, PartialEq, Record)]
struct Person {
    id: i64,
    name: String,
    nickname: Option<String>,
}

fn rendered(table: &DataTable) -> Vec<Vec<String>> {
    table
        .rows()
        .iter()
        .map(|row| row.values().iter().map(Value::render).collect())
        .collect()
}

fn data(columns: &[&str], rows: Vec<Vec<Value>>) -> DataTable {
    rows.into_iter()
        .fold(DataTable::new(columns.iter().copied()), |table, row| {
            table.row(row).unwrap()
        })
}

// =============================================================================
// Reading
// =============================================================================

#[test]
fn test_read_table() {
    let temp = people();
    let table = temp.db.read_table("People").unwrap();
    assert_eq!(table.columns(), ["Id", "Name"]);
    assert_eq!(rendered(&table), [["1", "a"], ["2", "b"]]);
    assert_eq!(table.rows()[0].get("id"), Some(&Value::Int(1)));
}

#[test]
fn test_execute_scalar() {
    let temp = people();
    let count = temp
        .db
        .execute_scalar(&Statement::new("SELECT COUNT(*) FROM People"))
        .unwrap();
    assert_eq!(count, Some(Value::Int(2)));

    let none = temp
        .db
        .execute_scalar(&Statement::new("SELECT Name FROM People WHERE Id = @id").bind("id", 99))
        .unwrap();
    assert_eq!(none, None);

    let null = temp
        .db
        .execute_scalar(&Statement::new("SELECT NULL"))
        .unwrap();
    assert_eq!(null, Some(Value::Null));
}

#[test]
fn test_execute_non_query_with_parameters() {
    let temp = people();
    let updated = temp
        .db
        .execute_non_query(
            &Statement::new("UPDATE People SET Name = @name WHERE Id = @id")
                .bind("name", "z")
                .bind("id", 2),
        )
        .unwrap();
    assert_eq!(updated, 1);
    let names = temp
        .db
        .query_strings(&Statement::new("SELECT Name FROM People ORDER BY Id"))
        .unwrap();
    assert_eq!(names, ["a", "z"]);
}

#[test]
fn test_execute_non_query_accepts_row_returning_pragma() {
    let temp = people();
    assert_eq!(run(&temp.db, "PRAGMA journal_mode=WAL"), 0);
    let mode = temp
        .db
        .query_strings(&Statement::new("PRAGMA journal_mode"))
        .unwrap();
    assert_eq!(mode, ["wal"]);
}

#[test]
fn test_syntax_error_is_backend_error() {
    let temp = people();
    let err = temp
        .db
        .execute_table(&Statement::new("SELEC * FROM People"))
        .unwrap_err();
    assert!(matches!(err, DalError::Backend(e) if e.message().contains("syntax error")));
}

#[test]
fn test_query_collection_with_derive() {
    let temp = people();
    let people: Vec<Person> = temp
        .db
        .query_collection(
            &Statement::new("SELECT Id, Name FROM People ORDER BY Id"),
            &FieldMap::new(),
        )
        .unwrap();
    assert_eq!(
        people,
        [
            Person { id: 1, name: "a".into(), nickname: None },
            Person { id: 2, name: "b".into(), nickname: None },
        ]
    );
}

#[test]
fn test_query_collection_with_rename() {
    let temp = people();
    let people: Vec<Person> = temp
        .db
        .query_collection(
            &Statement::new("SELECT Id, Name AS Alias FROM People WHERE Id = 1"),
            &FieldMap::new().rename("nickname", "Alias"),
        )
        .unwrap();
    assert_eq!(people[0].nickname.as_deref(), Some("a"));
    assert_eq!(people[0].name, "");
}

#[test]
fn test_stream_stops_early() {
    let temp = people();
    let (first, state) = temp
        .db
        .stream::<Person, _, _>(
            &Statement::new("SELECT * FROM People ORDER BY Id"),
            &FieldMap::new(),
            |people| {
                let first = people.next().transpose()?;
                people.close();
                Ok((first, people.state()))
            },
        )
        .unwrap();
    assert_eq!(first.map(|p| p.id), Some(1));
    assert_eq!(state, StreamState::Closed);

    // The file is not left locked by the abandoned cursor.
    assert_eq!(run(&temp.db, "DELETE FROM People"), 2);
}

#[test]
fn test_stream_rows_to_end() {
    let temp = people();
    let ids = temp
        .db
        .stream_rows(&Statement::new("SELECT Id FROM People ORDER BY Id"), |rows| {
            rows.map(|row| row.map(|r| r.values()[0].render()))
                .collect::<Result<Vec<_>>>()
        })
        .unwrap();
    assert_eq!(ids, ["1", "2"]);
}

// =============================================================================
// Introspection
// =============================================================================

#[test]
fn test_list_tables_in_creation_order() {
    let temp = people();
    run(&temp.db, "CREATE TABLE Orders (Id INTEGER)");
    run(&temp.db, "CREATE TABLE Archive (Id INTEGER)");
    assert_eq!(temp.db.list_tables().unwrap(), ["People", "Orders", "Archive"]);
    assert_eq!(temp.db.table_at(2).unwrap(), "Archive");
}

#[test]
fn test_table_at_out_of_range() {
    let temp = people();
    let err = temp.db.table_at(1).unwrap_err();
    assert!(matches!(err, DalError::IndexOutOfRange { index: 1, count: 1 }));
}

#[test]
fn test_table_exists() {
    let temp = people();
    assert!(temp.db.table_exists("PEOPLE").unwrap());
    assert!(!temp.db.table_exists("Orders").unwrap());
}

#[test]
fn test_empty_database_has_no_tables() {
    let temp = empty();
    assert!(temp.db.list_tables().unwrap().is_empty());
    assert!(matches!(
        temp.db.table_at(0),
        Err(DalError::IndexOutOfRange { index: 0, count: 0 })
    ));
}

// =============================================================================
// Writing
// =============================================================================

#[test]
fn test_write_then_read_round_trip() {
    let temp = empty();
    let source = data(
        &["Id", "Name"],
        vec![
            vec![Value::Int(1), Value::Text("a".into())],
            vec![Value::Int(2), Value::Text("b".into())],
        ],
    );

    assert_eq!(temp.db.write_table("People", &source).unwrap(), 2);

    let table = temp.db.read_table("People").unwrap();
    assert_eq!(table.columns(), ["Id", "Name"]);
    assert_eq!(rendered(&table), [["1", "a"], ["2", "b"]]);
    // Created columns are TEXT, so numbers come back as text.
    assert_eq!(table.rows()[0].get("Id"), Some(&Value::Text("1".into())));
}

#[test]
fn test_write_sanitizes_column_names() {
    let temp = empty();
    let source = data(
        &["First Name", "Last;Name"],
        vec![vec![Value::Text("Ada".into()), Value::Null]],
    );
    temp.db.write_table("Names", &source).unwrap();

    let table = temp.db.read_table("Names").unwrap();
    assert_eq!(table.columns(), ["FirstName", "LastName"]);
    assert_eq!(
        table.rows()[0].values(),
        [Value::Text("Ada".into()), Value::Null]
    );
}

#[test]
fn test_append_uses_existing_column_affinity() {
    let temp = people();
    let source = data(
        &["Id", "Name"],
        vec![vec![Value::Int(3), Value::Text("c".into())]],
    );
    temp.db.write_table("People", &source).unwrap();

    let table = temp
        .db
        .execute_table(&Statement::new("SELECT * FROM People ORDER BY Id"))
        .unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.rows()[2].values(),
        [Value::Int(3), Value::Text("c".into())]
    );
}

#[test]
fn test_append_keeps_blob_and_bool_types() {
    let temp = empty();
    run(&temp.db, "CREATE TABLE Files (Name TEXT, Data BLOB, Flag INTEGER)");
    let source = data(
        &["Name", "Data", "Flag"],
        vec![vec![
            Value::Text("f".into()),
            Value::Blob(vec![0x0A, 0xFF]),
            Value::Bool(true),
        ]],
    );
    temp.db.write_table("Files", &source).unwrap();

    let table = temp
        .db
        .execute_table(&Statement::new(
            "SELECT Data, typeof(Data), Flag, typeof(Flag) FROM Files",
        ))
        .unwrap();
    assert_eq!(
        table.rows()[0].values(),
        [
            Value::Blob(vec![0x0A, 0xFF]),
            Value::Text("blob".into()),
            Value::Int(1),
            Value::Text("integer".into()),
        ]
    );
}

#[test]
fn test_failed_insert_keeps_earlier_rows() {
    let temp = empty();
    run(&temp.db, "CREATE TABLE U (Id INTEGER UNIQUE)");
    let source = data(
        &["Id"],
        vec![vec![Value::Int(1)], vec![Value::Int(1)], vec![Value::Int(2)]],
    );

    let err = temp.db.write_table("U", &source).unwrap_err();

    assert!(matches!(
        err,
        DalError::Backend(e) if e.message().contains("UNIQUE constraint failed")
    ));
    let ids = temp
        .db
        .query_strings(&Statement::new("SELECT Id FROM U"))
        .unwrap();
    assert_eq!(ids, ["1"]);
}

#[test]
fn test_write_invalid_table_name_runs_nothing() {
    let temp = people();
    let source = data(&["Id"], vec![vec![Value::Int(1)]]);
    let err = temp.db.write_table("Bad];DROP", &source).unwrap_err();
    assert!(matches!(err, DalError::InvalidIdentifier(name) if name == "Bad];DROP"));
    assert_eq!(temp.db.list_tables().unwrap(), ["People"]);
}

#[test]
fn test_write_to_read_only_database_fails() {
    let temp = people();
    let path = temp.dir.path().join("test.db");
    let params = ConnectionParams::new(
        "sqlite",
        format!("Data Source={};Mode=ReadOnly", path.display()),
    );
    let db = oxide_dal_sqlite::registry().open(&params).unwrap();
    assert_eq!(db.read_table("People").unwrap().len(), 2);

    let source = data(&["Id"], vec![vec![Value::Int(1)]]);
    let err = db.write_table("Other", &source).unwrap_err();
    assert!(matches!(err, DalError::Backend(e) if e.message().contains("readonly")));
}

// =============================================================================
// Opening
// =============================================================================

#[test]
fn test_open_file_by_extension() {
    let temp = people();
    let path = temp.dir.path().join("test.db");
    let db = oxide_dal_sqlite::open_file(&path).unwrap();
    assert_eq!(db.list_tables().unwrap(), ["People"]);
}

#[test]
fn test_open_missing_file_fails_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let db = oxide_dal_sqlite::open_file(dir.path().join("missing.db")).unwrap();
    assert!(matches!(db.list_tables(), Err(DalError::Backend(_))));
}

#[test]
fn test_open_unsupported_extension() {
    let err = oxide_dal_sqlite::open_file("book.xlsx").unwrap_err();
    assert!(matches!(err, DalError::UnsupportedFormat(ext) if ext == ".xlsx"));
}
