//! imprint CLI - batch image-to-JPG conversion with author EXIF stamping.
//!
//! Walks `input-images/<author>/**`, converts every supported image to an
//! RGB JPG with the author stamped into EXIF metadata, and skips files whose
//! content fingerprint is already in the processing ledger.
//!
//! # Usage
//!
//! ```bash
//! # Convert everything new under input-images/
//! imprint run
//!
//! # Custom locations
//! imprint run --input ./photos --output ./converted --ledger ./ledger.json
//!
//! # Inspect state
//! imprint ledger show
//! imprint config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// imprint - convert author-foldered images to EXIF-stamped JPGs.
#[derive(Parser, Debug)]
#[command(name = "imprint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert new images and update the processing ledger
    Run(cli::run::RunArgs),

    /// Inspect the processing ledger
    Ledger(cli::ledger::LedgerArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match imprint_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `imprint config path`."
            );
            imprint_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("imprint v{}", imprint_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(config, args).await,
        Commands::Ledger(args) => cli::ledger::execute(config, args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
