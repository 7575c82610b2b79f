//! Source acquisition through yt-dlp
//!
//! Downloads land in `<base>/<video_id>/`:
//!
//! ```text
//! <video_id>_video.mp4     video-only stream
//! <video_id>_audio.<ext>   audio-only stream, container chosen by the site
//! source.json              id, url, title and the clip discriminator
//! ```
//!
//! The discriminator is the sanitized title. It is stored in `source.json`
//! so that a later run reusing the download names its clips the same way.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapters::process::run_tool;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::{find_file, find_media_pair, sanitize_filename, MAX_TITLE_LENGTH};

/// Metadata file written next to every download
pub const SOURCE_METADATA_FILE: &str = "source.json";

/// Contents of `source.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub safe_title: String,
    pub downloaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Read the metadata of a source folder, if present and well formed
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(SOURCE_METADATA_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable source metadata");
                None
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<(), DomainError> {
        let path = dir.join(SOURCE_METADATA_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::FsFail(format!("cannot encode source metadata: {}", e)))?;
        std::fs::write(&path, json)
            .map_err(|e| DomainError::FsFail(format!("cannot write {}: {}", path.display(), e)))
    }
}

/// Downloads sources with yt-dlp
pub struct YtDlpAcquirer {
    program: String,
    base_directory: PathBuf,
}

impl YtDlpAcquirer {
    pub fn new(program: impl Into<String>, base_directory: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_directory: base_directory.into(),
        }
    }

    fn source_dir(&self, video_id: &str) -> PathBuf {
        self.base_directory.join(video_id)
    }

    /// Folder name wins when no metadata was written
    fn discriminator_for(dir: &Path, fallback: &str) -> String {
        SourceMetadata::load(dir)
            .map(|metadata| metadata.safe_title)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Look for a folder other than `<base>/<id>` whose metadata names `id`
    fn find_by_metadata(&self, video_id: &str) -> Option<AcquiredSource> {
        walkdir::WalkDir::new(&self.base_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .find_map(|entry| {
                let dir = entry.path();
                let metadata = SourceMetadata::load(dir)?;
                if metadata.video_id != video_id {
                    return None;
                }
                let (video_path, audio_path) = find_media_pair(dir, None)?;
                Some(AcquiredSource {
                    video_path,
                    audio_path,
                    discriminator: metadata.safe_title,
                })
            })
    }

    async fn yt_dlp(&self, args: &[&str]) -> Result<String, DomainError> {
        run_tool(&self.program, args)
            .await
            .map_err(|e| DomainError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl AcquirePort for YtDlpAcquirer {
    async fn find_existing(
        &self,
        source: &SourceRef,
    ) -> Result<Option<AcquiredSource>, DomainError> {
        let dir = self.source_dir(&source.id);
        if let Some((video_path, audio_path)) = find_media_pair(&dir, Some(&source.id)) {
            return Ok(Some(AcquiredSource {
                video_path,
                audio_path,
                discriminator: Self::discriminator_for(&dir, &source.id),
            }));
        }

        Ok(self.find_by_metadata(&source.id))
    }

    async fn acquire(&self, source: &SourceRef) -> Result<AcquiredSource, DomainError> {
        let url = source.url.as_deref().ok_or_else(|| {
            DomainError::BadArgs(format!("source {} has no URL to download from", source.id))
        })?;

        let dir = self.source_dir(&source.id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| DomainError::FsFail(format!("cannot create {}: {}", dir.display(), e)))?;

        info!(source_id = %source.id, url, "Downloading source");

        let title = self
            .yt_dlp(&["--no-playlist", "--skip-download", "--print", "title", url])
            .await?
            .trim()
            .to_string();
        let safe_title = sanitize_filename(&title, MAX_TITLE_LENGTH);
        debug!(source_id = %source.id, title = %title, safe_title = %safe_title, "Resolved title");

        let video_path = dir.join(format!("{}_video.mp4", source.id));
        let video_target = video_path.to_string_lossy().into_owned();
        self.yt_dlp(&[
            "--no-playlist",
            "-f",
            "bestvideo[ext=mp4]/bestvideo",
            "--remux-video",
            "mp4",
            "-o",
            video_target.as_str(),
            url,
        ])
        .await?;

        let audio_template = dir
            .join(format!("{}_audio.%(ext)s", source.id))
            .to_string_lossy()
            .into_owned();
        self.yt_dlp(&["--no-playlist", "-f", "bestaudio", "-o", audio_template.as_str(), url])
            .await?;

        if !video_path.is_file() {
            return Err(DomainError::Unavailable(format!(
                "yt-dlp reported success but {} is missing",
                video_path.display()
            )));
        }
        let audio_path = find_file(&dir, &format!("{}_audio.", source.id), "").ok_or_else(|| {
            DomainError::Unavailable(format!("no audio file downloaded into {}", dir.display()))
        })?;

        SourceMetadata {
            video_id: source.id.clone(),
            url: url.to_string(),
            title,
            safe_title: safe_title.clone(),
            downloaded_at: Utc::now(),
        }
        .save(&dir)?;

        Ok(AcquiredSource {
            video_path,
            audio_path,
            discriminator: safe_title,
        })
    }
}
