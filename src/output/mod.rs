//! Output tree layout, clip naming and the existing-clip index
//!
//! ```text
//! <root>/funny/video/*.mp4
//! <root>/funny/audio/*.<ext>
//! <root>/funny/merged/*.mp4   (merge mode only)
//! <root>/normal/...
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::model::{ClipRecord, Label};
use crate::error::{ClipBatchError, ClipBatchResult};

pub mod filename;
pub mod index;

pub use filename::ClipFilenameCodec;
pub use index::ExistingClipIndex;

/// Where the clips for a label end up
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
    merge_clips: bool,
}

/// Output files for a single clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutputPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub merged: Option<PathBuf>,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, merge_clips: bool) -> Self {
        Self {
            root: root.into(),
            merge_clips,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn merge_clips(&self) -> bool {
        self.merge_clips
    }

    pub fn video_dir(&self, label: Label) -> PathBuf {
        self.root.join(label.dir_name()).join("video")
    }

    pub fn audio_dir(&self, label: Label) -> PathBuf {
        self.root.join(label.dir_name()).join("audio")
    }

    pub fn merged_dir(&self, label: Label) -> PathBuf {
        self.root.join(label.dir_name()).join("merged")
    }

    /// Create every directory the run may write into
    pub fn ensure(&self) -> ClipBatchResult<()> {
        for label in Label::ALL {
            let mut dirs = vec![self.video_dir(label), self.audio_dir(label)];
            if self.merge_clips {
                dirs.push(self.merged_dir(label));
            }
            for dir in dirs {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    ClipBatchError::OutputTreeUnreadable {
                        path: dir.display().to_string(),
                        message: e.to_string(),
                    }
                })?;
            }
        }
        debug!(root = %self.root.display(), merge = self.merge_clips, "Output layout ready");
        Ok(())
    }

    /// Paths for a clip; the audio clip keeps the source audio's extension
    pub fn paths_for(&self, record: &ClipRecord, audio_extension: &str) -> ClipOutputPaths {
        let stem = ClipFilenameCodec::stem(
            record.label,
            record.sequence_number,
            &record.source_discriminator,
            record.start_seconds,
            record.end_seconds,
        );

        ClipOutputPaths {
            video: self.video_dir(record.label).join(&record.filename),
            audio: self
                .audio_dir(record.label)
                .join(format!("{}.{}", stem, audio_extension)),
            merged: self
                .merge_clips
                .then(|| self.merged_dir(record.label).join(format!("{}.mp4", stem))),
        }
    }
}
