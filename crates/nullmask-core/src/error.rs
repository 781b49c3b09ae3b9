//! Error types for nullmask-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nullmask-core
#[derive(Debug, Error)]
pub enum Error {
    /// Table is not a well-formed table (ragged columns, duplicate names)
    #[error("invalid table: {0}")]
    InvalidTable(String),

    /// Probability outside [0.0, 1.0]
    #[error("probability must be between 0.0 and 1.0, got {0}")]
    ProbabilityOutOfRange(f64),

    /// Pattern failed to compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Input file does not exist
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file has an extension we cannot read
    #[error("unsupported input format '{}': expected a .csv or .tsv file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to create the output file
    #[error("failed to create file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the output table
    #[error("failed to write CSV '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad category of an [`Error`], used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Argument is not a valid table
    Type,
    /// Value outside its allowed range
    Range,
    /// Input path does not exist
    NotFound,
    /// Input has the wrong extension or cannot be parsed
    Format,
    /// Output could not be written
    Write,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Human-readable prefix for log messages
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Type => "Type error",
            ErrorKind::Range => "Value error",
            ErrorKind::NotFound => "File error",
            ErrorKind::Format => "Format error",
            ErrorKind::Write => "Write error",
            ErrorKind::Unknown => "Unexpected error",
        }
    }
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTable(_) => ErrorKind::Type,
            Error::ProbabilityOutOfRange(_) => ErrorKind::Range,
            Error::InputNotFound(_) => ErrorKind::NotFound,
            Error::UnsupportedFormat(_)
            | Error::FileRead { .. }
            | Error::CsvParse { .. }
            | Error::Csv { .. } => ErrorKind::Format,
            Error::FileWrite { .. } | Error::Write { .. } => ErrorKind::Write,
            Error::InvalidPattern { .. } | Error::Io(_) | Error::Json(_) => ErrorKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::InvalidTable("x".into()).kind(), ErrorKind::Type);
        assert_eq!(Error::ProbabilityOutOfRange(1.5).kind(), ErrorKind::Range);
        assert_eq!(
            Error::InputNotFound(PathBuf::from("missing.csv")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::UnsupportedFormat(PathBuf::from("data.txt")).kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Error::ProbabilityOutOfRange(-0.1);
        assert_eq!(
            err.to_string(),
            "probability must be between 0.0 and 1.0, got -0.1"
        );

        let err = Error::InputNotFound(PathBuf::from("missing.csv"));
        assert_eq!(err.to_string(), "input file not found: missing.csv");
        assert_eq!(err.kind().label(), "File error");
    }
}
