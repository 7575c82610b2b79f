//! Logging setup for the command-line tool

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{ClipBatchError, ClipBatchResult};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// Compact text format
    Compact,
    /// JSON format for structured logging
    Json,
}

/// Logging configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or `clipbatch=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
        Self {
            level: level.into(),
            format,
        }
    }

    /// `RUST_LOG` wins over the configured level
    pub fn filter(&self) -> ClipBatchResult<EnvFilter> {
        let directive = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&directive).map_err(|e| ClipBatchError::Config {
            message: format!("invalid log level '{}': {}", directive, e),
        })
    }

    /// Install the global subscriber. Logs go to stderr so stdout stays
    /// free for reports.
    pub fn initialize(&self) -> ClipBatchResult<()> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_writer(std::io::stderr)
            .with_target(false);

        let result = match self.format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };

        result.map_err(|e| ClipBatchError::Config {
            message: format!("cannot initialize logging: {}", e),
        })?;

        tracing::debug!(level = %self.level, format = ?self.format, "Logging initialized");
        Ok(())
    }
}
