//! The application level error type.
use crate::operations::form::FieldErrors;

/// Errors that may occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The SQLite database backing the store could not be opened, read or written.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The stored transaction list could not be encoded or decoded.
    #[error("could not (de)serialize transactions: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A file or the terminal could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row of an import file was rejected. `line` is 1-based.
    #[error("line {line}: {message}")]
    Import { line: usize, message: String },

    /// User input failed form validation.
    #[error("invalid transaction: {0}")]
    Validation(FieldErrors),

    /// A command needed an existing transaction and none had this id.
    #[error("transaction with id {0} not found")]
    NotFound(String),
}
