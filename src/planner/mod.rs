//! Clip planning: timestamp CSV ingestion and grouping by source video

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::model::{ClipRequest, RejectedRow};
use crate::domain::rules::{RawRow, RowValidator};
use crate::error::{ClipBatchError, ClipBatchResult};

pub mod grouping;

pub use grouping::VideoGrouper;

/// Name of the per-folder timestamp file
pub const TIMESTAMPS_FILE: &str = "timestamps.csv";

/// Outcome of reading one timestamp CSV
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub requests: Vec<ClipRequest>,
    pub rejections: Vec<RejectedRow>,
    pub comment_rows: usize,
}

/// Reads timestamp CSVs and validates every row
pub struct BatchParser {
    validator: RowValidator,
}

impl BatchParser {
    pub fn new(validator: RowValidator) -> Self {
        Self { validator }
    }

    /// Parse a CSV file.
    ///
    /// A missing or unreadable file fails the whole file; bad rows never do.
    pub fn parse_file(&self, path: &Path) -> ClipBatchResult<ParsedBatch> {
        let file = File::open(path).map_err(|e| ClipBatchError::CsvUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.parse_reader(file, &path.display().to_string())
    }

    /// Parse CSV data from any reader; `origin` names it in error messages
    pub fn parse_reader<R: Read>(&self, reader: R, origin: &str) -> ClipBatchResult<ParsedBatch> {
        let unreadable = |e: csv::Error| ClipBatchError::CsvUnreadable {
            path: origin.to_string(),
            message: e.to_string(),
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(unreadable)?
            .iter()
            .map(normalize_header)
            .collect();

        let mut batch = ParsedBatch::default();
        for (offset, record) in csv_reader.records().enumerate() {
            let record = record.map_err(unreadable)?;
            // Header is line 1, so the first data row is line 2
            let row_number = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(offset as u64 + 2);

            let cells = headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            let row = RawRow::new(row_number, cells);

            match self.validator.validate(&row) {
                None => batch.comment_rows += 1,
                Some(Ok(request)) => batch.requests.push(request),
                Some(Err(rejected)) => {
                    warn!(
                        row = rejected.source_row_number,
                        reason = %rejected.reason,
                        "Ignoring row"
                    );
                    batch.rejections.push(rejected);
                }
            }
        }

        debug!(
            origin,
            accepted = batch.requests.len(),
            rejected = batch.rejections.len(),
            comments = batch.comment_rows,
            "Parsed timestamp file"
        );
        Ok(batch)
    }
}

fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// State of a folder's timestamp file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvStatus {
    /// No timestamp file
    Missing,
    /// Only header and comment rows
    Empty,
    /// At least one data row
    Ready,
    /// File exists but cannot be read as CSV
    Error,
}

impl CsvStatus {
    /// Classify a timestamp file without validating its rows
    pub fn inspect(path: &Path) -> Self {
        if !path.exists() {
            return CsvStatus::Missing;
        }

        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(_) => return CsvStatus::Error,
        };

        let mut has_data = false;
        for record in reader.records() {
            match record {
                Ok(record) => {
                    let comment = record.iter().any(|cell| cell.starts_with('#'));
                    let blank = record.iter().all(str::is_empty);
                    if !comment && !blank {
                        has_data = true;
                    }
                }
                Err(_) => return CsvStatus::Error,
            }
        }

        if has_data {
            CsvStatus::Ready
        } else {
            CsvStatus::Empty
        }
    }
}

impl std::fmt::Display for CsvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            CsvStatus::Missing => "missing",
            CsvStatus::Empty => "empty",
            CsvStatus::Ready => "ready",
            CsvStatus::Error => "error",
        };
        f.write_str(text)
    }
}
