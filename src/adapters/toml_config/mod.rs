// Config file adapter - Application settings from TOML or YAML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::exec_ffmpeg::{DEFAULT_CRF, DEFAULT_PRESET};
use crate::domain::errors::*;
use crate::domain::rules::DurationLimits;

/// Files tried, in order, when no `--config` is given
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["clipbatch.toml", "config.toml", "config.yaml"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub base_directory: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("downloads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipsConfig {
    pub output_directory: PathBuf,
    pub min_duration: f64,
    pub max_duration: f64,
    pub merge_clips: bool,
    pub encode_timeout_secs: u64,
    /// x264 constant rate factor for video clips
    pub video_crf: u8,
    /// x264 preset for video clips
    pub video_preset: String,
}

impl Default for ClipsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("clips"),
            min_duration: 5.0,
            max_duration: 7.0,
            merge_clips: true,
            encode_timeout_secs: 300,
            video_crf: DEFAULT_CRF,
            video_preset: DEFAULT_PRESET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub skip_existing_downloads: bool,
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            skip_existing_downloads: true,
            continue_on_error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub yt_dlp: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            yt_dlp: "yt-dlp".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub download: DownloadConfig,
    pub clips: ClipsConfig,
    pub batch: BatchConfig,
    pub tools: ToolsConfig,
}

impl AppConfig {
    pub fn duration_limits(&self) -> Result<DurationLimits, DomainError> {
        DurationLimits::new(self.clips.min_duration, self.clips.max_duration)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.duration_limits()?;
        if self.clips.encode_timeout_secs == 0 {
            return Err(DomainError::BadArgs(
                "clips.encode_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.clips.video_crf > 51 {
            return Err(DomainError::BadArgs(format!(
                "clips.video_crf must be between 0 and 51, got {}",
                self.clips.video_crf
            )));
        }
        Ok(())
    }
}

/// Reads configuration files; the format follows the file extension
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a configuration file; `.yaml`/`.yml` is YAML, anything else TOML
    pub fn load(path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::FsFail(format!("cannot read config file {}: {}", path.display(), e))
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            _ => Self::parse_toml(&content),
        }
        .map_err(|e| DomainError::BadArgs(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Pick the configuration file to use.
    ///
    /// An explicit path must exist. Without one, the first default file found
    /// in `dir` is used, or none.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Option<PathBuf>, DomainError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(DomainError::BadArgs(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let found = DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        if found.is_none() {
            debug!("No configuration file found, using defaults");
        }
        Ok(found)
    }

    pub fn parse_toml(content: &str) -> Result<AppConfig, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn parse_yaml(content: &str) -> Result<AppConfig, String> {
        // An empty YAML document deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}
