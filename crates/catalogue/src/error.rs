//! Error types for the catalogue crate.

use thiserror::Error;

/// Errors that can occur while loading or querying the catalogue
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// I/O error occurred while reading the catalogue file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The SQLite store rejected a statement or could not be opened
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row in the catalogue file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a row doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// No row with this identifier
    #[error("Movie not found: {id}")]
    NotFound { id: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogueError>;
