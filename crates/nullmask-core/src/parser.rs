//! Delimited-file reader producing [`Table`]s

use crate::error::{Error, Result};
use crate::table::{CellValue, Column, Table};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

/// Supported delimited file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values (`.csv`)
    Csv,
    /// Tab-separated values (`.tsv`)
    Tsv,
}

impl TableFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "tsv" => Some(TableFormat::Tsv),
            _ => None,
        }
    }

    /// Field delimiter byte
    pub fn delimiter(self) -> u8 {
        match self {
            TableFormat::Csv => b',',
            TableFormat::Tsv => b'\t',
        }
    }
}

/// Read a delimited file into a Table.
///
/// The format is picked from the file extension. A missing file is
/// reported as [`Error::InputNotFound`], an unknown extension as
/// [`Error::UnsupportedFormat`].
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }

    let format =
        TableFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;

    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_reader(BufReader::new(file), format, path)
}

/// Parse delimited text from a string (useful for testing)
pub fn parse_table_str(content: &str, format: TableFormat) -> Result<Table> {
    parse_reader(content.as_bytes(), format, Path::new("<string>"))
}

fn parse_reader<R: Read>(reader: R, format: TableFormat, path: &Path) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .delimiter(format.delimiter())
        .from_reader(reader);

    let csv_error = |e: csv::Error| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let headers = csv_reader.headers().map_err(csv_error)?.clone();

    if headers.is_empty() {
        return Err(Error::CsvParse {
            path: path.to_path_buf(),
            message: "no columns found".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(Error::CsvParse {
                path: path.to_path_buf(),
                message: format!("duplicate column name '{}'", name),
            });
        }
    }

    let mut fields: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(csv_error)?;

        if record.len() > headers.len() {
            warn!(
                "row {} in {} has more cells than columns, truncating",
                row_idx + 1,
                path.display()
            );
        }

        // Short rows are padded with nulls
        for (col_idx, column) in fields.iter_mut().enumerate() {
            column.push(record.get(col_idx).map(str::to_string));
        }
    }

    let columns = headers
        .iter()
        .zip(fields)
        .map(|(name, fields)| Column::new(name, infer_column(fields)))
        .collect();

    Ok(Table { columns })
}

/// Type a whole column at once.
///
/// The column stays numeric or boolean only when every non-null field parses
/// that way. Otherwise every non-null field is kept as its original text.
fn infer_column(fields: Vec<Option<String>>) -> Vec<CellValue> {
    let parsed: Vec<CellValue> = fields
        .iter()
        .map(|f| f.as_deref().map_or(CellValue::Null, CellValue::parse))
        .collect();

    let numeric = parsed.iter().all(|c| {
        matches!(
            c,
            CellValue::Null | CellValue::Integer(_) | CellValue::Float(_)
        )
    });
    let boolean = parsed
        .iter()
        .all(|c| matches!(c, CellValue::Null | CellValue::Bool(_)));
    if numeric || boolean {
        return parsed;
    }

    parsed
        .into_iter()
        .zip(fields)
        .map(|(cell, field)| match (cell, field) {
            (CellValue::Null, _) | (_, None) => CellValue::Null,
            (_, Some(text)) => CellValue::String(text),
        })
        .collect()
}
