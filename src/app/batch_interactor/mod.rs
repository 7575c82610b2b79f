// Batch interactor - One CSV of `url,start,end,label` rows across many videos

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::app::clip_orchestrator::{ClipOrchestrator, RunReport};
use crate::domain::model::RejectedRow;
use crate::error::ClipBatchResult;
use crate::planner::{BatchParser, ParsedBatch, VideoGrouper};

/// A rejected row in report form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionEntry {
    pub row: u64,
    pub kind: &'static str,
    pub message: String,
}

impl From<&RejectedRow> for RejectionEntry {
    fn from(rejected: &RejectedRow) -> Self {
        Self {
            row: rejected.source_row_number,
            kind: rejected.reason.kind(),
            message: rejected.reason.to_string(),
        }
    }
}

/// What one timestamp file contributed to a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSummary {
    pub origin: PathBuf,
    pub accepted: usize,
    pub comment_rows: usize,
    pub rejected: Vec<RejectionEntry>,
    /// Set when the file could not be read at all
    pub error: Option<String>,
}

impl InputSummary {
    pub fn from_parsed(origin: &Path, parsed: &ParsedBatch) -> Self {
        Self {
            origin: origin.to_path_buf(),
            accepted: parsed.requests.len(),
            comment_rows: parsed.comment_rows,
            rejected: parsed.rejections.iter().map(RejectionEntry::from).collect(),
            error: None,
        }
    }

    pub fn unreadable(origin: &Path, error: impl Into<String>) -> Self {
        Self {
            origin: origin.to_path_buf(),
            accepted: 0,
            comment_rows: 0,
            rejected: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Inputs plus the run they fed
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub inputs: Vec<InputSummary>,
    pub report: RunReport,
}

impl BatchOutcome {
    pub fn rejected_rows(&self) -> usize {
        self.inputs.iter().map(|input| input.rejected.len()).sum()
    }
}

/// Interactor for the batch CSV workflow
pub struct BatchInteractor {
    parser: BatchParser,
    orchestrator: ClipOrchestrator,
}

impl BatchInteractor {
    pub fn new(parser: BatchParser, orchestrator: ClipOrchestrator) -> Self {
        Self {
            parser,
            orchestrator,
        }
    }

    /// Parse, group and process a batch CSV.
    ///
    /// An unreadable CSV aborts before anything is downloaded.
    pub async fn execute(&self, csv_path: &Path) -> ClipBatchResult<BatchOutcome> {
        let parsed = self.parser.parse_file(csv_path)?;
        let input = InputSummary::from_parsed(csv_path, &parsed);

        let groups = VideoGrouper::group(parsed.requests);
        info!(
            csv = %csv_path.display(),
            clips = input.accepted,
            rejected = input.rejected.len(),
            videos = groups.len(),
            "Batch planned"
        );

        let report = self.orchestrator.run(groups).await?;
        Ok(BatchOutcome {
            inputs: vec![input],
            report,
        })
    }
}
