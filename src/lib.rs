//! ClipBatch Library
//!
//! Plans and cuts short labelled clips from source videos listed in
//! timestamp CSVs, numbering clips per label and skipping clips that already
//! exist in the output tree.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{DomainError, RejectionReason};
pub use domain::model::{ClipRecord, ClipRequest, Label, RunStatistics, SourceRef};
pub use error::{ClipBatchError, ClipBatchResult};
