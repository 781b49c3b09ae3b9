//! Core table types for representing tabular data

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An in-memory table made of named, equal-length columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Columns in file order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from columns, checking that it is well formed
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let table = Self { columns };
        table.validate()?;
        Ok(table)
    }

    /// Append a column
    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find a column by name for mutation
    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Get a single cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.find_column(column).and_then(|c| c.cells.get(row))
    }

    /// Collect the cells of one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.row_count() {
            return None;
        }
        self.columns.iter().map(|c| c.cells.get(index)).collect()
    }

    /// Check that every column has the same length and a unique name
    pub fn validate(&self) -> Result<()> {
        let expected = self.row_count();
        let mut seen = HashSet::new();

        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::InvalidTable(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != expected {
                return Err(Error::InvalidTable(format!(
                    "column '{}' has {} cells, expected {}",
                    column.name,
                    column.len(),
                    expected
                )));
            }
        }

        Ok(())
    }
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name from the header row
    pub name: String,
    /// Cell values, indexed by row
    pub cells: Vec<CellValue>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Number of cells in the column
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the column has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of null cells
    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }
}

/// Field texts read as null, in addition to the empty field
pub const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value
    String(String),
    /// Null marker, distinct from an empty string
    Null,
}

impl CellValue {
    /// Parse a field into a CellValue, detecting the type.
    ///
    /// An empty field or one of [`NULL_MARKERS`] is null. Strings are kept
    /// verbatim.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() || NULL_MARKERS.contains(&s) {
            return CellValue::Null;
        }

        let trimmed = s.trim();

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        // "inf" parses as a float but is a word here; "1e400" overflows
        if trimmed.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    return CellValue::Float(f);
                }
            }
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }

        CellValue::String(s.to_string())
    }

    /// Check if the cell holds the null marker
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The string payload, if this is a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to the text written to a delimited file
    pub fn to_string_value(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part ("3.0" rather than "3")
            CellValue::Float(fl) => write!(f, "{:?}", fl),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}
