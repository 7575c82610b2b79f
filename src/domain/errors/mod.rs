// Domain errors - Error types for the domain layer

use std::fmt;

use thiserror::Error;

/// Errors raised by ports and adapters
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Source video could not be acquired or located
    Unavailable(String),
    /// External tool ran but reported failure
    ExecutionFailed(String),
    /// External tool exceeded its time budget
    Timeout(String),
    /// File system operation failed
    FsFail(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::Unavailable(msg) => write!(f, "Source unavailable: {}", msg),
            DomainError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            DomainError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

/// Why a CSV row was not turned into a clip request.
///
/// Every variant is row-local: the batch carries on with the next row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectionReason {
    #[error("malformed time value '{value}'")]
    MalformedTime { value: String },

    #[error("invalid label '{value}' (expected f/funny or n/normal)")]
    InvalidLabel { value: String },

    #[error("clip length {duration:.1}s outside allowed {min}-{max}s")]
    DurationOutOfRange { duration: f64, min: f64, max: f64 },

    #[error("start time {start} is not before end time {end}")]
    InverseRange { start: f64, end: f64 },

    #[error("no video identifier found in '{url}'")]
    UnresolvableSource { url: String },

    #[error("missing field '{field}'")]
    MissingField { field: String },
}

impl RejectionReason {
    /// Short machine-friendly name of the rejection kind
    pub fn kind(&self) -> &'static str {
        match self {
            RejectionReason::MalformedTime { .. } => "malformed_time",
            RejectionReason::InvalidLabel { .. } => "invalid_label",
            RejectionReason::DurationOutOfRange { .. } => "duration_out_of_range",
            RejectionReason::InverseRange { .. } => "inverse_range",
            RejectionReason::UnresolvableSource { .. } => "unresolvable_source",
            RejectionReason::MissingField { .. } => "missing_field",
        }
    }
}
