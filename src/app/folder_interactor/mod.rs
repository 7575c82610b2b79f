// Folder interactor - Per-folder `timestamps.csv` workflow

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::app::batch_interactor::{BatchOutcome, InputSummary};
use crate::app::clip_orchestrator::ClipOrchestrator;
use crate::domain::model::{ClipRequest, Label, SourceRef};
use crate::domain::rules::{DurationLimits, RowValidator, SourceBinding};
use crate::error::ClipBatchResult;
use crate::planner::{BatchParser, CsvStatus, VideoGrouper, TIMESTAMPS_FILE};
use crate::utils::path::find_media_pair;

/// A source folder under the download directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderEntry {
    pub name: String,
    pub path: PathBuf,
    pub csv_status: CsvStatus,
    pub has_media: bool,
}

/// Interactor for folders that carry their own timestamp file
pub struct FolderInteractor {
    download_dir: PathBuf,
    limits: DurationLimits,
    orchestrator: ClipOrchestrator,
}

impl FolderInteractor {
    pub fn new(
        download_dir: impl Into<PathBuf>,
        limits: DurationLimits,
        orchestrator: ClipOrchestrator,
    ) -> Self {
        Self {
            download_dir: download_dir.into(),
            limits,
            orchestrator,
        }
    }

    /// List source folders with the state of their timestamp file.
    ///
    /// Label directories are not source folders and are left out.
    pub fn scan(&self) -> Vec<FolderEntry> {
        scan_folders(&self.download_dir)
    }

    /// Cut the clips listed in the given folders, or in every ready folder
    /// when `names` is empty. A folder whose CSV cannot be read is reported
    /// and the others still run.
    pub async fn execute(&self, names: &[String]) -> ClipBatchResult<BatchOutcome> {
        let selected: Vec<String> = if names.is_empty() {
            self.scan()
                .into_iter()
                .filter(|entry| entry.csv_status == CsvStatus::Ready)
                .map(|entry| entry.name)
                .collect()
        } else {
            names.to_vec()
        };

        let mut inputs = Vec::new();
        let mut requests: Vec<ClipRequest> = Vec::new();
        for name in &selected {
            let dir = self.download_dir.join(name);
            let csv_path = dir.join(TIMESTAMPS_FILE);
            if !dir.is_dir() {
                warn!(folder = %name, "Folder not found");
                inputs.push(InputSummary::unreadable(&csv_path, "folder not found"));
                continue;
            }

            let parser = BatchParser::new(RowValidator::new(
                self.limits,
                SourceBinding::Fixed(SourceRef::local(name.as_str())),
            ));
            match parser.parse_file(&csv_path) {
                Ok(parsed) => {
                    inputs.push(InputSummary::from_parsed(&csv_path, &parsed));
                    requests.extend(parsed.requests);
                }
                Err(e) => {
                    warn!(folder = %name, error = %e, "Skipping folder");
                    inputs.push(InputSummary::unreadable(&csv_path, e.to_string()));
                }
            }
        }

        let groups = VideoGrouper::group(requests);
        info!(folders = selected.len(), videos = groups.len(), "Folder extraction planned");

        let report = self.orchestrator.run(groups).await?;
        Ok(BatchOutcome { inputs, report })
    }
}

/// Source folders directly under `download_dir`, by name
pub fn scan_folders(download_dir: &Path) -> Vec<FolderEntry> {
    if !download_dir.is_dir() {
        warn!(dir = %download_dir.display(), "Download directory does not exist");
        return Vec::new();
    }

    walkdir::WalkDir::new(download_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if Label::ALL.iter().any(|label| label.dir_name() == name) {
                return None;
            }
            let path = entry.into_path();
            Some(FolderEntry {
                csv_status: CsvStatus::inspect(&path.join(TIMESTAMPS_FILE)),
                has_media: find_media_pair(&path, None).is_some(),
                name,
                path,
            })
        })
        .collect()
}
