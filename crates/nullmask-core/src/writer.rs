//! Delimited-file writer for [`Table`]s

use crate::error::{Error, Result};
use crate::parser::TableFormat;
use crate::table::Table;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a table to `path` in the given format.
///
/// Null cells are written as empty fields.
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P, format: TableFormat) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    write_to(table, BufWriter::new(file), format).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Render a table to a string (useful for testing)
pub fn write_table_string(table: &Table, format: TableFormat) -> Result<String> {
    let mut buf = Vec::new();
    write_to(table, &mut buf, format).map_err(|e| Error::Write {
        path: "<string>".into(),
        source: e,
    })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_to<W: Write>(table: &Table, writer: W, format: TableFormat) -> csv::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    csv_writer.write_record(table.column_names())?;

    for row_idx in 0..table.row_count() {
        let record = table
            .columns
            .iter()
            .map(|c| c.cells.get(row_idx).map(|v| v.to_string_value()).unwrap_or_default());
        csv_writer.write_record(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
