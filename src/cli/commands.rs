//! Command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::folder_interactor::scan_folders;
use crate::app::{BatchOutcome, FolderEntry};
use crate::cli::args::{BatchArgs, ExtractArgs, FoldersArgs, IndexArgs};
use crate::error::ClipBatchError;
use crate::output::index::LabelSummary;
use crate::output::ExistingClipIndex;

/// Execute the batch command
pub async fn batch(config: AppConfig, args: BatchArgs) -> Result<()> {
    info!(csv = %args.csv.display(), "Starting batch run");

    let container = DefaultAppContainer::new(config).context("Invalid configuration")?;
    let interactor = container.batch_interactor(args.on_duplicate.into());
    let outcome = interactor.execute(&args.csv).await?;

    report_outcome(&outcome, args.json)
}

/// Execute the extract command
pub async fn extract(config: AppConfig, args: ExtractArgs) -> Result<()> {
    info!(folders = ?args.names, "Starting folder extraction");

    let container = DefaultAppContainer::new(config).context("Invalid configuration")?;
    let interactor = container.folder_interactor(args.on_duplicate.into());
    let outcome = interactor.execute(&args.names).await?;

    if outcome.inputs.is_empty() {
        warn!("No folder with a ready timestamps.csv");
    }
    report_outcome(&outcome, args.json)
}

/// Execute the folders command
pub fn folders(config: AppConfig, args: FoldersArgs) -> Result<()> {
    let entries = scan_folders(&config.download.base_directory);

    if args.json {
        print_json(&entries)?;
    } else {
        display_folders(&entries);
    }
    Ok(())
}

/// Execute the index command
pub fn index(config: AppConfig, args: IndexArgs) -> Result<()> {
    let container = DefaultAppContainer::new(config).context("Invalid configuration")?;
    let index = ExistingClipIndex::rebuild(&container.layout())?;
    let summary = index.summary();

    if args.json {
        print_json(&summary)?;
    } else {
        display_index(&container.layout().root().display().to_string(), &summary);
    }
    Ok(())
}

/// Print the outcome, then turn a halted run into an error
fn report_outcome(outcome: &BatchOutcome, json: bool) -> Result<()> {
    if json {
        print_json(outcome)?;
    } else {
        display_outcome(outcome);
    }

    if let Some(halt) = &outcome.report.halted {
        return Err(ClipBatchError::Halted {
            source_id: halt.source_id.clone(),
            message: halt.message.clone(),
        }
        .into());
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Display a run outcome in human-readable format
fn display_outcome(outcome: &BatchOutcome) {
    let report = &outcome.report;
    let stats = &report.stats;
    let elapsed = (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0;

    for input in &outcome.inputs {
        match &input.error {
            Some(error) => println!("{}: not processed ({})", input.origin.display(), error),
            None => {
                println!(
                    "{}: {} clips, {} rows rejected",
                    input.origin.display(),
                    input.accepted,
                    input.rejected.len()
                );
                for rejected in &input.rejected {
                    println!("  row {}: {}", rejected.row, rejected.message);
                }
            }
        }
    }

    println!();
    println!("Run Summary");
    println!("===========");
    println!("Clips created:        {}", stats.created);
    println!("Duplicates skipped:   {}", stats.skipped_duplicate);
    println!("Clips failed:         {}", stats.failed);
    println!("Rows rejected:        {}", outcome.rejected_rows());
    println!("Sources downloaded:   {}", stats.downloaded);
    println!("Downloads reused:     {}", stats.skipped_existing_download);
    println!("Sources unavailable:  {}", stats.acquisition_failed);
    println!("Elapsed:              {:.1}s", elapsed);

    if let Some(halt) = &report.halted {
        println!();
        println!("Stopped at {}: {}", halt.source_id, halt.message);
    }
}

/// Display the folder listing in human-readable format
fn display_folders(entries: &[FolderEntry]) {
    if entries.is_empty() {
        println!("No video folders found");
        return;
    }

    println!("{:<8} {:<6} {}", "CSV", "MEDIA", "FOLDER");
    for entry in entries {
        println!(
            "{:<8} {:<6} {}",
            entry.csv_status.to_string(),
            if entry.has_media { "yes" } else { "no" },
            entry.name
        );
    }
}

/// Display index summary in human-readable format
fn display_index(root: &str, summary: &[LabelSummary]) {
    println!("Clips in {}", root);
    for label in summary {
        println!(
            "  {:<7} {:>4} clips, highest #{}, next #{}",
            label.label.to_string(),
            label.clips,
            label.highest_sequence.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            label.next_sequence.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
}
