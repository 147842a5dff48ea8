//! The `imprint ledger` command for inspecting the processing ledger.

use clap::{Args, Subcommand};
use imprint_core::{Config, Ledger};

/// Arguments for the `ledger` command.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

/// Subcommands for ledger inspection.
#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// List recorded fingerprints and their outputs
    Show,

    /// Show the ledger document path
    Path,
}

/// Execute the ledger command.
pub async fn execute(config: Config, args: LedgerArgs) -> anyhow::Result<()> {
    match args.command {
        LedgerCommand::Show => {
            let ledger = Ledger::load(config.ledger_path());
            if ledger.is_empty() {
                println!("Ledger is empty ({})", config.ledger_path().display());
                return Ok(());
            }

            for (fingerprint, record) in ledger.iter() {
                println!(
                    "{}  {}  {}",
                    &fingerprint[..8.min(fingerprint.len())],
                    record.processed_at,
                    record.output_filename
                );
            }
            println!("{} entr{}", ledger.len(), if ledger.len() == 1 { "y" } else { "ies" });
        }

        LedgerCommand::Path => {
            println!("{}", config.ledger_path().display());
        }
    }

    Ok(())
}
