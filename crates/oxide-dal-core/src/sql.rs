//! Generated statement text.
//!
//! Identifiers are interpolated literally: callers pass the table already
//! quoted by [`ConnectionFactory::quote_identifier`], after it went through
//! [`identifier::validate`](crate::identifier::validate), and column names
//! produced by [`identifier::sanitize`](crate::identifier::sanitize).
//!
//! [`ConnectionFactory::quote_identifier`]: crate::backend::ConnectionFactory::quote_identifier

/// `SELECT * FROM <table>`
#[must_use]
pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {table}")
}

/// `CREATE TABLE <table> (<col1> TEXT, <col2> TEXT, ...)`
#[must_use]
pub fn create_text_table(table: &str, columns: &[String]) -> String {
    let definitions: Vec<String> = columns.iter().map(|c| format!("{c} TEXT")).collect();
    format!("CREATE TABLE {table} ({})", definitions.join(", "))
}

/// `INSERT INTO <table>(<col1>, <col2>, ...) VALUES (@<col1>, @<col2>, ...)`
#[must_use]
pub fn insert(table: &str, columns: &[String]) -> String {
    let placeholders: Vec<String> = columns.iter().map(|c| placeholder(c)).collect();
    format!(
        "INSERT INTO {table}({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Named placeholder for a column.
#[must_use]
pub fn placeholder(column: &str) -> String {
    format!("@{column}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_select_all() {
        assert_eq!(select_all("[People]"), "SELECT * FROM [People]");
        assert_eq!(select_all("\"Sheet1$\""), "SELECT * FROM \"Sheet1$\"");
    }

    #[test]
    fn test_create_text_table() {
        assert_eq!(
            create_text_table("[People]", &cols(&["Id", "Name"])),
            "CREATE TABLE [People] (Id TEXT, Name TEXT)"
        );
    }

    #[test]
    fn test_insert() {
        assert_eq!(
            insert("[People]", &cols(&["Id", "Name"])),
            "INSERT INTO [People](Id, Name) VALUES (@Id, @Name)"
        );
    }
}
