// Clip orchestrator - Drives acquisition, deduplication and cutting per source video

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::{Allocation, DedupAllocator};
use crate::error::ClipBatchResult;
use crate::output::{ClipFilenameCodec, ExistingClipIndex, OutputLayout};
use crate::ports::*;

/// Run-wide policy knobs
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub layout: OutputLayout,
    pub skip_existing_downloads: bool,
    pub continue_on_error: bool,
    pub encode_timeout: Duration,
}

/// Where and why a run stopped early
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HaltInfo {
    pub source_id: String,
    pub message: String,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stats: RunStatistics,
    pub created: Vec<ClipRecord>,
    pub halted: Option<HaltInfo>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Per-video state machine:
/// acquire source -> ensure output layout -> for each request
/// (check duplicate -> skip | allocate -> cut -> record or fail) -> aggregate.
///
/// Requests are handled strictly one after another; the index is owned by
/// the run, so allocate-then-insert needs no locking.
pub struct ClipOrchestrator {
    acquire_port: Arc<dyn AcquirePort>,
    transcode_port: Arc<dyn TranscodePort>,
    duplicate_resolver: Arc<dyn DuplicateResolver>,
    events: Arc<dyn ClipEventSink>,
    settings: OrchestratorSettings,
}

impl ClipOrchestrator {
    pub fn new(
        acquire_port: Arc<dyn AcquirePort>,
        transcode_port: Arc<dyn TranscodePort>,
        duplicate_resolver: Arc<dyn DuplicateResolver>,
        events: Arc<dyn ClipEventSink>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            acquire_port,
            transcode_port,
            duplicate_resolver,
            events,
            settings,
        }
    }

    /// Process every group in order.
    ///
    /// Fails only when the output tree cannot be read or created; source and
    /// clip failures are counted in the report.
    pub async fn run(&self, groups: Vec<VideoGroup>) -> ClipBatchResult<RunReport> {
        let started_at = Utc::now();
        let mut index = ExistingClipIndex::rebuild(&self.settings.layout)?;
        info!(
            existing = index.len(),
            videos = groups.len(),
            "Starting clip run"
        );

        let mut stats = RunStatistics::default();
        let mut created = Vec::new();
        let mut halted = None;

        for group in &groups {
            self.events.on_video_started(group);

            let acquired = match self.acquire_source(&group.source, &mut stats).await {
                Ok(acquired) => acquired,
                Err(e) => {
                    let message = e.to_string();
                    stats.acquisition_failed += 1;
                    self.events.on_source_failed(&group.source, &message);

                    if !self.settings.continue_on_error {
                        warn!(source_id = %group.source.id, "Stopping run on first failure");
                        halted = Some(HaltInfo {
                            source_id: group.source.id.clone(),
                            message,
                        });
                        break;
                    }
                    continue;
                }
            };

            self.settings.layout.ensure()?;

            let video_stats = self
                .process_group(group, &acquired, &mut index, &mut created)
                .await;
            self.events.on_video_finished(&group.source, &video_stats);
            stats.absorb(&video_stats);
        }

        info!(
            created = stats.created,
            skipped = stats.skipped_duplicate,
            failed = stats.failed,
            "Clip run finished"
        );

        Ok(RunReport {
            stats,
            created,
            halted,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Reuse an earlier copy when allowed, otherwise acquire
    async fn acquire_source(
        &self,
        source: &SourceRef,
        stats: &mut RunStatistics,
    ) -> Result<AcquiredSource, DomainError> {
        if self.settings.skip_existing_downloads {
            match self.acquire_port.find_existing(source).await {
                Ok(Some(acquired)) => {
                    debug!(source_id = %source.id, "Reusing existing download");
                    stats.skipped_existing_download += 1;
                    self.events.on_source_ready(source, &acquired, true);
                    return Ok(acquired);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(source_id = %source.id, error = %e, "Existing download check failed")
                }
            }
        }

        let acquired = self.acquire_port.acquire(source).await?;
        stats.downloaded += 1;
        self.events.on_source_ready(source, &acquired, false);
        Ok(acquired)
    }

    async fn process_group(
        &self,
        group: &VideoGroup,
        acquired: &AcquiredSource,
        index: &mut ExistingClipIndex,
        created: &mut Vec<ClipRecord>,
    ) -> RunStatistics {
        let mut stats = RunStatistics::default();
        let audio_extension = acquired.audio_extension();

        for request in &group.requests {
            let allocated = match DedupAllocator::resolve(request, index, &acquired.discriminator) {
                Allocation::Fresh { sequence_number } => Some(sequence_number),
                Allocation::Exhausted => None,
                Allocation::Duplicate(existing) => {
                    match self.duplicate_resolver.decide(request, &existing).await {
                        DuplicateDecision::Skip => {
                            stats.skipped_duplicate += 1;
                            self.events.on_clip_skipped(request, &existing);
                            continue;
                        }
                        DuplicateDecision::Recreate => index.next_sequence_number(request.label),
                    }
                }
            };
            let Some(sequence_number) = allocated else {
                warn!(label = %request.label, "Sequence numbers exhausted");
                stats.failed += 1;
                self.events.on_clip_failed(
                    request,
                    &format!("no sequence number left for label {}", request.label),
                );
                continue;
            };

            let record = ClipFilenameCodec::record(
                request.label,
                sequence_number,
                &acquired.discriminator,
                request.start_seconds,
                request.end_seconds,
            );
            let paths = self.settings.layout.paths_for(&record, &audio_extension);
            let job = CutJob {
                video_path: acquired.video_path.clone(),
                audio_path: acquired.audio_path.clone(),
                start_seconds: request.start_seconds,
                end_seconds: request.end_seconds,
                video_output: paths.video,
                audio_output: paths.audio,
                merged_output: paths.merged,
            };

            match self.cut_with_timeout(&job).await {
                Ok(report) => {
                    // Insert before the next request so it cannot get this number
                    index.insert(record.clone());
                    stats.created += 1;
                    self.events.on_clip_created(&record, &report);
                    created.push(record);
                }
                Err(e) => {
                    stats.failed += 1;
                    self.events.on_clip_failed(request, &e.to_string());
                }
            }
        }

        stats
    }

    async fn cut_with_timeout(&self, job: &CutJob) -> Result<CutReport, DomainError> {
        let timeout = self.settings.encode_timeout;
        match tokio::time::timeout(timeout, self.transcode_port.cut(job)).await {
            Ok(result) => result,
            Err(_) => {
                remove_outputs(job);
                Err(DomainError::Timeout(format!(
                    "clip {} not finished after {}s",
                    job.video_output.display(),
                    timeout.as_secs_f64()
                )))
            }
        }
    }
}

/// The transcoder was dropped mid-cut; whatever it wrote is incomplete
fn remove_outputs(job: &CutJob) {
    let outputs = [Some(&job.video_output), Some(&job.audio_output), job.merged_output.as_ref()];
    for path in outputs.into_iter().flatten() {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Could not remove partial output");
            }
        }
    }
}
