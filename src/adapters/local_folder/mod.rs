// Local folder adapter - Sources that already sit in a download folder

use std::path::PathBuf;

use async_trait::async_trait;

use crate::adapters::acquire_ytdlp::SourceMetadata;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::find_media_pair;

/// Resolves `SourceRef::local(folder)` to `<base>/<folder>/*_video.mp4` and
/// `*_audio.*`. Nothing is ever downloaded.
pub struct LocalFolderAcquirer {
    base_directory: PathBuf,
}

impl LocalFolderAcquirer {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
        }
    }

    fn locate(&self, source: &SourceRef) -> Option<AcquiredSource> {
        let dir = self.base_directory.join(&source.id);
        let (video_path, audio_path) = find_media_pair(&dir, None)?;

        // Downloads made by the batch tool keep their title-based discriminator
        let discriminator = SourceMetadata::load(&dir)
            .map(|metadata| metadata.safe_title)
            .unwrap_or_else(|| source.id.clone());

        Some(AcquiredSource {
            video_path,
            audio_path,
            discriminator,
        })
    }
}

#[async_trait]
impl AcquirePort for LocalFolderAcquirer {
    async fn find_existing(
        &self,
        source: &SourceRef,
    ) -> Result<Option<AcquiredSource>, DomainError> {
        Ok(self.locate(source))
    }

    async fn acquire(&self, source: &SourceRef) -> Result<AcquiredSource, DomainError> {
        self.locate(source).ok_or_else(|| {
            DomainError::Unavailable(format!(
                "no *_video.mp4 and *_audio.* pair in {}",
                self.base_directory.join(&source.id).display()
            ))
        })
    }
}
