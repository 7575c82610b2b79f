//! Configuration initialization and hierarchy management

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};

/// Initialize configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;

    // Step 1 and 2: defaults, overlaid by the config file if there is one
    let mut config = load_config_file(cli.config.as_deref(), &cwd)?;

    // Step 3: environment variables
    let env_overrides = apply_environment_overrides(&mut config, |key| std::env::var(key).ok())?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 4: command-line flags
    let cli_overrides = apply_cli_configuration_overrides(&mut config, &cli.command);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Load the configuration file, or defaults when none is found
pub fn load_config_file(explicit: Option<&Path>, dir: &Path) -> Result<AppConfig> {
    let path = TomlConfigAdapter::discover(explicit, dir).map_err(|e| anyhow!("{}", e))?;

    match path {
        Some(path) => TomlConfigAdapter::load(&path).map_err(|e| anyhow!("{}", e)),
        None => Ok(AppConfig::default()),
    }
}

/// Apply `CLIPBATCH_*` variables; returns how many were set
pub fn apply_environment_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let checks = [
        override_from(
            &lookup,
            "CLIPBATCH_MIN_DURATION",
            &mut config.clips.min_duration,
            parse_value,
        )?,
        override_from(
            &lookup,
            "CLIPBATCH_MAX_DURATION",
            &mut config.clips.max_duration,
            parse_value,
        )?,
        override_from(&lookup, "CLIPBATCH_MERGE_CLIPS", &mut config.clips.merge_clips, parse_bool)?,
        override_from(
            &lookup,
            "CLIPBATCH_ENCODE_TIMEOUT",
            &mut config.clips.encode_timeout_secs,
            parse_value,
        )?,
        override_from(&lookup, "CLIPBATCH_VIDEO_CRF", &mut config.clips.video_crf, parse_value)?,
        override_from(
            &lookup,
            "CLIPBATCH_VIDEO_PRESET",
            &mut config.clips.video_preset,
            parse_value,
        )?,
        override_from(
            &lookup,
            "CLIPBATCH_OUTPUT_DIR",
            &mut config.clips.output_directory,
            parse_value,
        )?,
        override_from(
            &lookup,
            "CLIPBATCH_DOWNLOAD_DIR",
            &mut config.download.base_directory,
            parse_value,
        )?,
        override_from(
            &lookup,
            "CLIPBATCH_SKIP_EXISTING_DOWNLOADS",
            &mut config.batch.skip_existing_downloads,
            parse_bool,
        )?,
        override_from(
            &lookup,
            "CLIPBATCH_CONTINUE_ON_ERROR",
            &mut config.batch.continue_on_error,
            parse_bool,
        )?,
    ];
    let applied = checks.iter().filter(|applied| **applied).count();

    Ok(applied)
}

fn override_from<F, T, P>(lookup: &F, key: &str, target: &mut T, parse: P) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    *target = parse(raw.trim()).map_err(|e| anyhow!("Invalid value for {}: {}", key, e))?;
    info!("Environment override: {} = {}", key, raw.trim());
    Ok(true)
}

fn parse_value<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| format!("'{}': {}", raw, e))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}

/// Apply command-line flags; returns how many were set
pub fn apply_cli_configuration_overrides(config: &mut AppConfig, command: &Commands) -> usize {
    match command {
        Commands::Batch(args) => {
            let mut overrides = set_path(&mut config.clips.output_directory, &args.output_dir)
                + set_path(&mut config.download.base_directory, &args.download_dir)
                + set_merge(config, args.merge.merge_clips());
            if args.stop_on_error {
                config.batch.continue_on_error = false;
                overrides += 1;
            }
            if args.redownload {
                config.batch.skip_existing_downloads = false;
                overrides += 1;
            }
            overrides
        }
        Commands::Extract(args) => {
            let mut overrides = set_path(&mut config.clips.output_directory, &args.output_dir)
                + set_path(&mut config.download.base_directory, &args.download_dir)
                + set_merge(config, args.merge.merge_clips());
            if args.stop_on_error {
                config.batch.continue_on_error = false;
                overrides += 1;
            }
            overrides
        }
        Commands::Folders(args) => {
            set_path(&mut config.download.base_directory, &args.download_dir)
        }
        Commands::Index(args) => set_path(&mut config.clips.output_directory, &args.output_dir),
    }
}

fn set_path(target: &mut PathBuf, value: &Option<PathBuf>) -> usize {
    match value {
        Some(value) => {
            *target = value.clone();
            1
        }
        None => 0,
    }
}

fn set_merge(config: &mut AppConfig, merge: Option<bool>) -> usize {
    match merge {
        Some(merge) => {
            config.clips.merge_clips = merge;
            1
        }
        None => 0,
    }
}
