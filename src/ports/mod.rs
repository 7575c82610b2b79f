// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for obtaining local copies of source videos
#[async_trait]
pub trait AcquirePort: Send + Sync {
    /// Return the local files of a source acquired earlier, if any
    async fn find_existing(
        &self,
        source: &SourceRef,
    ) -> Result<Option<AcquiredSource>, DomainError>;

    /// Fetch the source and return its local files
    async fn acquire(&self, source: &SourceRef) -> Result<AcquiredSource, DomainError>;
}

/// Port for cutting clips out of a source
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Produce the video clip, the audio clip and, if requested, the merged
    /// clip. An `Err` means the clip was not produced.
    async fn cut(&self, job: &CutJob) -> Result<CutReport, DomainError>;
}

/// Port deciding what happens to a request that duplicates an existing clip
#[async_trait]
pub trait DuplicateResolver: Send + Sync {
    async fn decide(&self, request: &ClipRequest, existing: &ClipRecord) -> DuplicateDecision;
}

/// Port receiving progress events from a run
pub trait ClipEventSink: Send + Sync {
    fn on_video_started(&self, _group: &VideoGroup) {}

    fn on_source_ready(&self, _source: &SourceRef, _acquired: &AcquiredSource, _reused: bool) {}

    fn on_source_failed(&self, _source: &SourceRef, _message: &str) {}

    fn on_clip_created(&self, record: &ClipRecord, report: &CutReport);

    fn on_clip_skipped(&self, request: &ClipRequest, existing: &ClipRecord);

    fn on_clip_failed(&self, request: &ClipRequest, message: &str);

    fn on_video_finished(&self, _source: &SourceRef, _stats: &RunStatistics) {}
}
