//! Error handling module for ClipBatch

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ClipBatch operations.
///
/// Everything here is fatal to the current file or run; row-level problems
/// are reported as [`crate::domain::model::RejectedRow`] instead.
#[derive(Error, Debug)]
pub enum ClipBatchError {
    /// Timestamp CSV missing or not readable as tabular data
    #[error("Cannot read timestamp file {path}: {message}")]
    CsvUnreadable { path: String, message: String },

    /// Clip output tree exists but cannot be listed
    #[error("Cannot read clip output directory {path}: {message}")]
    OutputTreeUnreadable { path: String, message: String },

    /// Configuration file or override is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Run stopped on the first failure because continue_on_error is off
    #[error("Run halted at source '{source_id}': {message}")]
    Halted { source_id: String, message: String },

    /// Error reported by a port
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ClipBatch operations
pub type ClipBatchResult<T> = std::result::Result<T, ClipBatchError>;
