//! clipbatch command-line entry point
//!
//! # Usage
//!
//! ```bash
//! clipbatch batch --csv batch.csv
//! clipbatch folders
//! clipbatch extract --name My_Video --on-duplicate ask
//! clipbatch index --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use clipbatch::cli::{commands, Cli, Commands};
use clipbatch::config_initialization::initialize_configuration_hierarchy;
use clipbatch::utils::logging::LoggingConfig;

/// Main entry point for the clipbatch CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    LoggingConfig::new(cli.log_level.clone(), cli.log_format).initialize()?;
    info!("Starting clipbatch {}", env!("CARGO_PKG_VERSION"));

    let config = initialize_configuration_hierarchy(&cli)?;

    // Execute the requested command
    match cli.command {
        Commands::Batch(args) => commands::batch(config, args).await?,
        Commands::Extract(args) => commands::extract(config, args).await?,
        Commands::Folders(args) => commands::folders(config, args)?,
        Commands::Index(args) => commands::index(config, args)?,
    }

    Ok(())
}
