//! Error types for the data-loader crate.
//!
//! Every failure while reading `movie.csv` / `rating.csv` is reported as a
//! `DataLoadError` so callers can tell a missing file from a malformed line.

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    ///
    /// Rust concept: `#[from]` generates `From<std::io::Error>`, so `?`
    /// converts the error automatically
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Record in a data file couldn't be parsed
    ///
    /// `line` is the 1-based line in the file, header included
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
