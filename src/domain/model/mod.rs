// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Classification of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Funny,
    Normal,
}

impl Label {
    /// Every label, in output-tree order
    pub const ALL: [Label; 2] = [Label::Funny, Label::Normal];

    /// Normalize free-form label text (`f`, `F`, `funny`, `n`, `Normal`, ...)
    pub fn normalize(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "f" | "funny" => Some(Label::Funny),
            "n" | "normal" => Some(Label::Normal),
            _ => None,
        }
    }

    /// One-letter prefix used in clip filenames
    pub fn prefix(&self) -> char {
        match self {
            Label::Funny => 'f',
            Label::Normal => 'n',
        }
    }

    /// Inverse of [`Label::prefix`]
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'f' => Some(Label::Funny),
            'n' => Some(Label::Normal),
            _ => None,
        }
    }

    /// Directory name under the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Label::Funny => "funny",
            Label::Normal => "normal",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Identity of the source video a request refers to.
///
/// `id` is the platform video identifier (batch CSV) or the folder name
/// (per-folder CSV); `url` is only present for the batch form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub url: Option<String>,
}

impl SourceRef {
    /// Source identified by a remote URL
    pub fn remote(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: Some(url.into()),
        }
    }

    /// Source that already lives in a local folder
    pub fn local(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
        }
    }
}

/// A validated request for one clip, built from one CSV row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRequest {
    pub source: SourceRef,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub label: Label,
    pub duration_seconds: f64,
    pub source_row_number: u64,
}

/// A row that was not accepted, with the reason why
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub source_row_number: u64,
    pub reason: crate::domain::errors::RejectionReason,
}

impl fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.source_row_number, self.reason)
    }
}

/// Requests sharing one source video, in first-seen CSV order
#[derive(Debug, Clone, PartialEq)]
pub struct VideoGroup {
    pub source: SourceRef,
    pub requests: Vec<ClipRequest>,
}

/// A clip that exists on disk, or is about to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRecord {
    pub label: Label,
    pub sequence_number: u32,
    pub source_discriminator: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub filename: String,
}

/// Local media files for one source video
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredSource {
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    /// Discriminator embedded in every clip filename cut from this source
    pub discriminator: String,
}

impl AcquiredSource {
    /// Extension of the audio file, reused for the audio clip
    pub fn audio_extension(&self) -> String {
        self.audio_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "m4a".to_string())
    }
}

/// Everything the transcoder needs to cut one clip
#[derive(Debug, Clone, PartialEq)]
pub struct CutJob {
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub video_output: PathBuf,
    pub audio_output: PathBuf,
    pub merged_output: Option<PathBuf>,
}

impl CutJob {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Outcome of a successful cut
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutReport {
    /// Set when the optional merged clip could not be produced.
    /// The separate video and audio clips are still valid.
    pub merge_warning: Option<String>,
}

/// What to do with a request that duplicates an existing clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateDecision {
    Skip,
    /// Cut it again under a fresh sequence number
    Recreate,
}

/// Run counters, purely additive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub created: u64,
    pub skipped_duplicate: u64,
    pub failed: u64,
    pub downloaded: u64,
    pub skipped_existing_download: u64,
    pub acquisition_failed: u64,
}

impl RunStatistics {
    /// Add another set of counters into this one
    pub fn absorb(&mut self, other: &RunStatistics) {
        self.created += other.created;
        self.skipped_duplicate += other.skipped_duplicate;
        self.failed += other.failed;
        self.downloaded += other.downloaded;
        self.skipped_existing_download += other.skipped_existing_download;
        self.acquisition_failed += other.acquisition_failed;
    }
}
