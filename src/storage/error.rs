//! Storage error types
//!
//! Defines all errors that can occur in the record store and its indexes.

use thiserror::Error;

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Caller supplied structurally invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// An equal record is already stored
    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistent index backend failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StorageError {
    /// True for the errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::Validation(_) | StorageError::DuplicateRecord(_)
        )
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
