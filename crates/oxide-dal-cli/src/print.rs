//! Plain-text and JSON rendering of result tables.

use std::io::{self, Write};

use oxide_dal_core::DataTable;

/// Width of each column: the longest of its header and rendered cells.
pub fn column_widths(table: &DataTable) -> Vec<usize> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            table
                .rows()
                .iter()
                .filter_map(|row| row.get_index(i))
                .map(|value| value.render().chars().count())
                .fold(name.chars().count(), usize::max)
        })
        .collect()
}

/// Writes the header and rows, each cell right-aligned to its column width
/// and followed by ` | `.
pub fn write_table<W: Write>(table: &DataTable, out: &mut W) -> io::Result<()> {
    let widths = column_widths(table);

    for (name, width) in table.columns().iter().zip(&widths) {
        write!(out, "{name:>width$} | ")?;
    }
    writeln!(out)?;

    for row in table.rows() {
        for (value, width) in row.values().iter().zip(&widths) {
            write!(out, "{:>width$} | ", value.render())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the table as a JSON array of objects keyed by column name.
pub fn write_json<W: Write>(table: &DataTable, out: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, table)?;
    writeln!(out)?;
    Ok(())
}
