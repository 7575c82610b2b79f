// Adapters - External system implementations

pub mod acquire_ytdlp;
pub mod exec_ffmpeg;
pub mod local_folder;
pub mod process;
pub mod prompt_stdin;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use acquire_ytdlp::YtDlpAcquirer;
pub use exec_ffmpeg::FfmpegTranscoder;
pub use local_folder::LocalFolderAcquirer;
pub use prompt_stdin::{AutoSkipResolver, StdinDuplicatePrompt};
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::TracingEventSink;
