//! FFmpeg execution adapter
//!
//! Cuts one clip as three ffmpeg invocations:
//!
//! 1. video clip, re-encoded with libx264 so the cut is frame accurate
//! 2. audio clip, stream copied
//! 3. merged clip (optional), muxing the two clips just written
//!
//! A failed merge leaves the separate clips in place and is reported as a
//! warning on the [`CutReport`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::adapters::process::run_tool;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// x264 quality used when the configuration names none
pub const DEFAULT_CRF: u8 = 23;
pub const DEFAULT_PRESET: &str = "fast";

/// ffmpeg-backed transcoder
pub struct FfmpegTranscoder {
    program: String,
    crf: u8,
    preset: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
        }
    }

    pub fn with_quality(mut self, crf: u8, preset: impl Into<String>) -> Self {
        self.crf = crf;
        self.preset = preset.into();
        self
    }

    fn video_clip_args(&self, job: &CutJob) -> Vec<String> {
        FfmpegArgs::new()
            .arg("-ss")
            .seconds(job.start_seconds)
            .input(&job.video_path)
            .arg("-t")
            .seconds(job.duration())
            .args(["-c:v", "libx264", "-crf"])
            .arg(self.crf.to_string())
            .arg("-preset")
            .arg(&self.preset)
            .args(["-avoid_negative_ts", "make_zero"])
            .output(&job.video_output)
    }

    fn audio_clip_args(&self, job: &CutJob) -> Vec<String> {
        FfmpegArgs::new()
            .input(&job.audio_path)
            .arg("-ss")
            .seconds(job.start_seconds)
            .arg("-t")
            .seconds(job.duration())
            .args(["-c:a", "copy", "-avoid_negative_ts", "make_zero"])
            .output(&job.audio_output)
    }

    fn merge_args(&self, job: &CutJob, merged: &Path) -> Vec<String> {
        FfmpegArgs::new()
            .input(&job.video_output)
            .input(&job.audio_output)
            .args(["-c:v", "copy", "-c:a", "aac"])
            .output(merged)
    }

    async fn ffmpeg(&self, args: Vec<String>) -> Result<(), DomainError> {
        run_tool(&self.program, &args)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::ExecutionFailed(e.to_string()))
    }
}

#[async_trait]
impl TranscodePort for FfmpegTranscoder {
    async fn cut(&self, job: &CutJob) -> Result<CutReport, DomainError> {
        debug!(
            video = %job.video_output.display(),
            start = job.start_seconds,
            end = job.end_seconds,
            "Cutting clip"
        );

        if let Err(e) = self.ffmpeg(self.video_clip_args(job)).await {
            remove_partial(&[&job.video_output]);
            return Err(e);
        }

        if let Err(e) = self.ffmpeg(self.audio_clip_args(job)).await {
            remove_partial(&[&job.video_output, &job.audio_output]);
            return Err(e);
        }

        let mut report = CutReport::default();
        if let Some(merged) = &job.merged_output {
            if let Err(e) = self.ffmpeg(self.merge_args(job, merged)).await {
                warn!(merged = %merged.display(), error = %e, "Merged clip not produced");
                remove_partial(&[merged]);
                report.merge_warning = Some(e.to_string());
            }
        }

        Ok(report)
    }
}

/// Remove whatever a failed invocation left behind
fn remove_partial(paths: &[&PathBuf]) {
    for path in paths {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Could not remove partial output");
            }
        }
    }
}

/// Argument list builder; every invocation overwrites and stays quiet
struct FfmpegArgs {
    args: Vec<String>,
}

impl FfmpegArgs {
    fn new() -> Self {
        Self {
            args: vec!["-hide_banner".into(), "-loglevel".into(), "error".into()],
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn seconds(self, seconds: f64) -> Self {
        self.arg(format!("{:.3}", seconds))
    }

    fn input(self, path: &Path) -> Self {
        self.arg("-i").arg(path.to_string_lossy())
    }

    fn output(self, path: &Path) -> Vec<String> {
        self.arg("-y").arg(path.to_string_lossy()).args
    }
}
