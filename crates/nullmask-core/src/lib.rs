//! nullmask-core: Core library for masking tabular data with nulls
//!
//! This library provides functionality to:
//! - Parse CSV and TSV files into column-oriented tables
//! - Replace cells with a null marker at random, optionally only cells
//!   whose text matches a pattern or that sit in selected columns
//! - Write masked tables back out in the input's format
//! - Run masking jobs singly or from a JSON batch file

pub mod error;
pub mod injector;
pub mod job;
pub mod parser;
pub mod table;
pub mod writer;

pub use error::{Error, ErrorKind, Result};
pub use injector::{
    inject_nulls, parse_column_list, ColumnReport, InjectOptions, Injection, InjectionReport,
    DEFAULT_PROBABILITY,
};
pub use job::{run_batch, run_job, BatchFile, BatchResult, MaskJob};
pub use parser::{parse_table_str, read_table, TableFormat};
pub use table::{CellValue, Column, Table};
pub use writer::{write_table, write_table_string};
