use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    AppConfig, AutoSkipResolver, FfmpegTranscoder, LocalFolderAcquirer, StdinDuplicatePrompt,
    TracingEventSink, YtDlpAcquirer,
};
use crate::app::{
    batch_interactor::BatchInteractor,
    clip_orchestrator::{ClipOrchestrator, OrchestratorSettings},
    folder_interactor::FolderInteractor,
    DuplicatePolicy,
};
use crate::domain::errors::DomainError;
use crate::domain::rules::{DurationLimits, RowValidator, SourceBinding};
use crate::output::OutputLayout;
use crate::planner::BatchParser;
use crate::ports::{AcquirePort, ClipEventSink, DuplicateResolver, TranscodePort};

pub trait AppContainer: Send + Sync {
    fn batch_interactor(&self, policy: DuplicatePolicy) -> Arc<BatchInteractor>;
    fn folder_interactor(&self, policy: DuplicatePolicy) -> Arc<FolderInteractor>;
}

/// Wires the production adapters from a validated configuration
pub struct DefaultAppContainer {
    config: AppConfig,
    limits: DurationLimits,
    transcode_port: Arc<dyn TranscodePort>,
    events: Arc<dyn ClipEventSink>,
}

impl DefaultAppContainer {
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let limits = config.duration_limits()?;

        let transcode_port = Arc::new(
            FfmpegTranscoder::new(config.tools.ffmpeg.clone())
                .with_quality(config.clips.video_crf, config.clips.video_preset.clone()),
        );
        let events = Arc::new(TracingEventSink::new());

        Ok(Self {
            config,
            limits,
            transcode_port,
            events,
        })
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.config.clips.output_directory, self.config.clips.merge_clips)
    }

    fn resolver(policy: DuplicatePolicy) -> Arc<dyn DuplicateResolver> {
        match policy {
            DuplicatePolicy::Skip => Arc::new(AutoSkipResolver),
            DuplicatePolicy::Ask => Arc::new(StdinDuplicatePrompt::new()),
        }
    }

    fn orchestrator(
        &self,
        acquire_port: Arc<dyn AcquirePort>,
        policy: DuplicatePolicy,
        skip_existing_downloads: bool,
    ) -> ClipOrchestrator {
        ClipOrchestrator::new(
            acquire_port,
            Arc::clone(&self.transcode_port),
            Self::resolver(policy),
            Arc::clone(&self.events),
            OrchestratorSettings {
                layout: self.layout(),
                skip_existing_downloads,
                continue_on_error: self.config.batch.continue_on_error,
                encode_timeout: Duration::from_secs(self.config.clips.encode_timeout_secs),
            },
        )
    }
}

impl AppContainer for DefaultAppContainer {
    fn batch_interactor(&self, policy: DuplicatePolicy) -> Arc<BatchInteractor> {
        let acquire_port = Arc::new(YtDlpAcquirer::new(
            self.config.tools.yt_dlp.clone(),
            &self.config.download.base_directory,
        ));
        let parser = BatchParser::new(RowValidator::new(self.limits, SourceBinding::UrlColumn));

        Arc::new(BatchInteractor::new(
            parser,
            self.orchestrator(acquire_port, policy, self.config.batch.skip_existing_downloads),
        ))
    }

    fn folder_interactor(&self, policy: DuplicatePolicy) -> Arc<FolderInteractor> {
        let acquire_port = Arc::new(LocalFolderAcquirer::new(&self.config.download.base_directory));

        // Local folders are always used as they are
        Arc::new(FolderInteractor::new(
            &self.config.download.base_directory,
            self.limits,
            self.orchestrator(acquire_port, policy, true),
        ))
    }
}
