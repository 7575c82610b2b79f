// Tracing log adapter - Renders run events as structured tracing events

use tracing::{error, info, warn};

use crate::domain::model::*;
use crate::ports::*;

/// Event sink writing every run event to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl ClipEventSink for TracingEventSink {
    fn on_video_started(&self, group: &VideoGroup) {
        info!(source_id = %group.source.id, clips = group.requests.len(), "Processing video");
    }

    fn on_source_ready(&self, source: &SourceRef, acquired: &AcquiredSource, reused: bool) {
        if reused {
            info!(
                source_id = %source.id,
                discriminator = %acquired.discriminator,
                "Using existing download"
            );
        } else {
            info!(
                source_id = %source.id,
                discriminator = %acquired.discriminator,
                video = %acquired.video_path.display(),
                "Downloaded source"
            );
        }
    }

    fn on_source_failed(&self, source: &SourceRef, message: &str) {
        error!(source_id = %source.id, error = message, "Source unavailable");
    }

    fn on_clip_created(&self, record: &ClipRecord, report: &CutReport) {
        info!(
            label = %record.label,
            sequence = record.sequence_number,
            file = %record.filename,
            "Clip created"
        );
        if let Some(warning) = &report.merge_warning {
            warn!(file = %record.filename, warning = %warning, "Merged clip missing");
        }
    }

    fn on_clip_skipped(&self, request: &ClipRequest, existing: &ClipRecord) {
        info!(
            row = request.source_row_number,
            existing = %existing.filename,
            "Duplicate clip skipped"
        );
    }

    fn on_clip_failed(&self, request: &ClipRequest, message: &str) {
        error!(
            row = request.source_row_number,
            label = %request.label,
            start = request.start_seconds,
            end = request.end_seconds,
            error = message,
            "Clip failed"
        );
    }

    fn on_video_finished(&self, source: &SourceRef, stats: &RunStatistics) {
        info!(
            source_id = %source.id,
            created = stats.created,
            skipped = stats.skipped_duplicate,
            failed = stats.failed,
            "Video done"
        );
    }
}
