//! The `imprint run` command: batch conversion with progress and a summary.

use std::path::PathBuf;

use clap::Args;
use imprint_core::{Config, FileStatus, Ledger, Pipeline, RunStats};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input directory to scan (overrides config)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for converted JPGs (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Ledger document path (overrides config)
    #[arg(short, long)]
    pub ledger: Option<PathBuf>,

    /// JPEG encoding quality, 1-100 (overrides config)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Print run statistics as JSON to stdout
    #[arg(long)]
    pub stats_json: bool,
}

/// Execute the run command.
pub async fn execute(mut config: Config, args: RunArgs) -> anyhow::Result<()> {
    if let Some(input) = args.input {
        config.paths.input_dir = input;
    }
    if let Some(output) = args.output {
        config.paths.output_dir = output;
    }
    if let Some(ledger) = args.ledger {
        config.paths.ledger_path = ledger;
    }
    if let Some(quality) = args.quality {
        config.processing.jpeg_quality = quality;
    }
    config.validate()?;

    let pipeline = Pipeline::new(&config);
    let mut ledger = Ledger::load(config.ledger_path());
    tracing::info!(
        "Ledger at {:?} holds {} entr{}",
        ledger.path(),
        ledger.len(),
        if ledger.len() == 1 { "y" } else { "ies" }
    );

    // Discover once: the same list sizes the progress bar and feeds the run.
    let files = pipeline.discover();
    let progress = create_progress_bar(files.len() as u64);

    let start_time = std::time::Instant::now();
    let stats = pipeline.run_files(&files, &mut ledger, |outcome| {
        if let FileStatus::Failed { error } = &outcome.status {
            progress.println(format!("  failed {:?}: {}", outcome.path, error));
        }
        progress.inc(1);
    })?;
    let elapsed = start_time.elapsed();

    progress.finish_and_clear();
    print_summary(&stats, elapsed);

    if args.stats_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("converting...");
    pb
}

/// Print a formatted summary table after a batch run.
fn print_summary(stats: &RunStats, elapsed: std::time::Duration) {
    let mb_processed = stats.total_bytes as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Converted:    {:>8}", stats.converted);
    if stats.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", stats.skipped);
    }
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.total_files);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Converted MB: {:>7.1}", mb_processed);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn workspace_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.paths.input_dir = dir.join("input-images");
        config.paths.output_dir = dir.join("output");
        config.paths.ledger_path = dir.join("processed_files.json");
        config
    }

    #[tokio::test]
    async fn test_execute_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input-images").join("alice").join("a.png");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([1, 2, 3])))
            .save(&source)
            .unwrap();

        let config = workspace_config(dir.path());
        let args = RunArgs {
            input: None,
            output: None,
            ledger: None,
            quality: Some(85),
            stats_json: false,
        };

        execute(config, args).await.unwrap();
        assert!(dir.path().join("processed_files.json").exists());
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_quality() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace_config(dir.path());
        let args = RunArgs {
            input: None,
            output: None,
            ledger: None,
            quality: Some(0),
            stats_json: false,
        };

        assert!(execute(config, args).await.is_err());
    }
}
