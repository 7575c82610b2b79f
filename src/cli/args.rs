//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::app::DuplicatePolicy;

/// What to do when a requested clip already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnDuplicate {
    /// Keep the existing clip
    Skip,
    /// Ask for each duplicate
    Ask,
}

impl From<OnDuplicate> for DuplicatePolicy {
    fn from(value: OnDuplicate) -> Self {
        match value {
            OnDuplicate::Skip => DuplicatePolicy::Skip,
            OnDuplicate::Ask => DuplicatePolicy::Ask,
        }
    }
}

/// Merged-clip switches shared by the cutting commands
#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Do not produce merged video+audio clips
    #[arg(long, conflicts_with = "merge")]
    pub no_merge: bool,

    /// Produce merged video+audio clips
    #[arg(long)]
    pub merge: bool,
}

impl MergeArgs {
    /// `None` leaves the configured value alone
    pub fn merge_clips(&self) -> Option<bool> {
        if self.no_merge {
            Some(false)
        } else if self.merge {
            Some(true)
        } else {
            None
        }
    }
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Batch CSV with url,start,end,label columns
    #[arg(long, default_value = "timestamps.csv")]
    pub csv: PathBuf,

    /// Duplicate handling
    #[arg(long, value_enum, default_value_t = OnDuplicate::Skip)]
    pub on_duplicate: OnDuplicate,

    /// Stop at the first video that cannot be acquired
    #[arg(long)]
    pub stop_on_error: bool,

    /// Download again even if a copy exists
    #[arg(long)]
    pub redownload: bool,

    #[command(flatten)]
    pub merge: MergeArgs,

    /// Clip output root
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Download root
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the folders command
#[derive(Args, Debug)]
pub struct FoldersArgs {
    /// Download root
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Folder to process (repeatable); every ready folder when omitted
    #[arg(long = "name")]
    pub names: Vec<String>,

    /// Duplicate handling
    #[arg(long, value_enum, default_value_t = OnDuplicate::Skip)]
    pub on_duplicate: OnDuplicate,

    /// Stop at the first folder without usable media
    #[arg(long)]
    pub stop_on_error: bool,

    #[command(flatten)]
    pub merge: MergeArgs,

    /// Clip output root
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Download root
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Clip output root
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
