//! CLI module for clipbatch
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::{BatchArgs, ExtractArgs, FoldersArgs, IndexArgs, OnDuplicate};

/// Batch clip extractor
///
/// Turns spreadsheets of time ranges into labelled, numbered video and audio
/// clips, skipping clips that already exist.
#[derive(Parser, Debug)]
#[command(name = "clipbatch")]
#[command(about = "Cut labelled clips from videos listed in timestamp CSVs")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(long, global = true, env = "CLIPBATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download videos and cut clips from a `url,start,end,label` CSV
    Batch(BatchArgs),
    /// List download folders and the state of their timestamps.csv
    Folders(FoldersArgs),
    /// Cut clips from per-folder `start,end,label` CSVs
    Extract(ExtractArgs),
    /// Show the clips already in the output tree
    Index(IndexArgs),
}
