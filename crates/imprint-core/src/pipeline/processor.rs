//! Pipeline orchestration - wires discovery, hashing, the ledger, and the
//! converter into a single sequential batch run.

use std::path::PathBuf;

use chrono::Local;

use crate::config::Config;
use crate::error::Result;
use crate::ledger::{Ledger, ProcessingRecord};
use crate::types::{FileOutcome, FileStatus, RunStats};

use super::author::resolve_author;
use super::convert::Converter;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::hash::Hasher;

/// The batch pipeline: discover candidates, skip ledgered fingerprints,
/// convert the rest, record successes.
pub struct Pipeline {
    discovery: FileDiscovery,
    converter: Converter,
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Pipeline {
    /// Create a new pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            discovery: FileDiscovery::new(config.processing.clone()),
            converter: Converter::new(config.processing.jpeg_quality),
            input_dir: config.input_dir(),
            output_dir: config.output_dir(),
        }
    }

    /// Discover all candidate image files under the input root.
    pub fn discover(&self) -> Vec<DiscoveredFile> {
        self.discovery.discover(&self.input_dir)
    }

    /// Run the full batch.
    ///
    /// Per-file errors (read, decode, encode, write) are isolated: the file
    /// is reported as failed and the batch continues. Ledger save failures
    /// abort the run - losing the ledger means reprocessing everything next
    /// time, so they escalate.
    ///
    /// `on_file` observes every outcome in order; the CLI uses it to drive
    /// its progress bar.
    pub fn run(
        &self,
        ledger: &mut Ledger,
        on_file: impl FnMut(&FileOutcome),
    ) -> Result<RunStats> {
        if !self.input_dir.exists() {
            tracing::warn!("Input directory {:?} does not exist", self.input_dir);
            return Ok(RunStats::default());
        }
        self.run_files(&self.discover(), ledger, on_file)
    }

    /// Run the batch over an already-discovered file list.
    ///
    /// Lets callers that need the candidate count up front (e.g. to size a
    /// progress bar) discover once and reuse the list here.
    pub fn run_files(
        &self,
        files: &[DiscoveredFile],
        ledger: &mut Ledger,
        mut on_file: impl FnMut(&FileOutcome),
    ) -> Result<RunStats> {
        std::fs::create_dir_all(&self.output_dir)?;
        tracing::info!("Found {} image file(s) to process", files.len());

        let mut stats = RunStats {
            total_files: files.len(),
            ..RunStats::default()
        };

        for file in files {
            let outcome = self.process_file(file, ledger)?;
            match &outcome.status {
                FileStatus::Converted { .. } => {
                    stats.converted += 1;
                    stats.total_bytes += file.size;
                }
                FileStatus::Skipped => stats.skipped += 1,
                FileStatus::Failed { .. } => stats.failed += 1,
            }
            on_file(&outcome);
        }

        // Always leave a fresh valid document behind, even for runs where
        // nothing converted (e.g. after corrupt-ledger recovery).
        ledger.save()?;

        Ok(stats)
    }

    /// Process one candidate file against the ledger.
    ///
    /// Returns `Err` only for ledger persistence failures; conversion
    /// problems land in the returned [`FileOutcome`].
    fn process_file(&self, file: &DiscoveredFile, ledger: &mut Ledger) -> Result<FileOutcome> {
        let bytes = match std::fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Cannot read {:?}: {}", file.path, e);
                return Ok(FileOutcome {
                    path: file.path.clone(),
                    status: FileStatus::Failed {
                        error: format!("read error: {}", e),
                    },
                });
            }
        };

        let fingerprint = Hasher::content_hash_from_bytes(&bytes);
        if ledger.contains(&fingerprint) {
            tracing::debug!("Skipping already-processed {:?}", file.path);
            return Ok(FileOutcome {
                path: file.path.clone(),
                status: FileStatus::Skipped,
            });
        }

        let author = resolve_author(&file.path, &self.input_dir);
        let timestamp = Local::now();

        match self.converter.convert_bytes(
            &bytes,
            &file.path,
            &author,
            &fingerprint,
            timestamp,
            &self.output_dir,
        ) {
            Ok(converted) => {
                ledger.record(
                    fingerprint,
                    ProcessingRecord {
                        output_filename: converted.output_filename.clone(),
                        processed_at: timestamp.to_rfc3339(),
                    },
                );
                // Flush after every success: a crash loses at most the file
                // currently being converted.
                ledger.save()?;
                Ok(FileOutcome {
                    path: file.path.clone(),
                    status: FileStatus::Converted {
                        output_filename: converted.output_filename,
                    },
                })
            }
            Err(e) => {
                tracing::error!("Failed: {:?} - {}", file.path, e);
                Ok(FileOutcome {
                    path: file.path.clone(),
                    status: FileStatus::Failed {
                        error: e.to_string(),
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.paths.input_dir = dir.join("input-images");
        config.paths.output_dir = dir.join("output");
        config.paths.ledger_path = dir.join("processed_files.json");
        config
    }

    fn write_png(path: &std::path::Path, color: [u8; 3]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb(color)))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_run_converts_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_png(&config.paths.input_dir.join("alice").join("a.png"), [255, 0, 0]);

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        let stats = pipeline.run(&mut ledger, |_| {}).unwrap();

        assert_eq!(stats.converted, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(ledger.len(), 1);
        assert!(config.ledger_path().exists());
    }

    #[test]
    fn test_second_run_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_png(&config.paths.input_dir.join("alice").join("a.png"), [255, 0, 0]);
        write_png(&config.paths.input_dir.join("bob").join("b.png"), [0, 255, 0]);

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        pipeline.run(&mut ledger, |_| {}).unwrap();

        let mut ledger = Ledger::load(config.ledger_path());
        let stats = pipeline.run(&mut ledger, |_| {}).unwrap();
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_per_file_failure_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let input = config.paths.input_dir.clone();
        write_png(&input.join("alice").join("a.png"), [255, 0, 0]);
        std::fs::write(input.join("alice").join("broken.png"), b"not an image").unwrap();

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        let stats = pipeline.run(&mut ledger, |_| {}).unwrap();

        assert_eq!(stats.converted, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_files, 2);
    }

    #[test]
    fn test_missing_input_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        let stats = pipeline.run(&mut ledger, |_| {}).unwrap();
        assert_eq!(stats.total_files, 0);
    }

    #[test]
    fn test_identical_content_dedups_across_authors() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        // Same pixel content under two authors: one converts, one skips.
        write_png(&config.paths.input_dir.join("alice").join("x.png"), [7, 7, 7]);
        write_png(&config.paths.input_dir.join("bob").join("x.png"), [7, 7, 7]);

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        let stats = pipeline.run(&mut ledger, |_| {}).unwrap();

        assert_eq!(stats.converted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_outcomes_observed_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_png(&config.paths.input_dir.join("bob").join("b.png"), [1, 2, 3]);
        write_png(&config.paths.input_dir.join("alice").join("a.png"), [4, 5, 6]);

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        let mut seen = Vec::new();
        pipeline
            .run(&mut ledger, |outcome| seen.push(outcome.path.clone()))
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert!(seen[0].ends_with("alice/a.png"));
        assert!(seen[1].ends_with("bob/b.png"));
    }

    #[test]
    fn test_failed_ledger_save_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        // A directory at the ledger path makes the rename in save() fail.
        config.paths.ledger_path = dir.path().join("ledgerdir");
        std::fs::create_dir_all(&config.paths.ledger_path).unwrap();
        write_png(&config.paths.input_dir.join("alice").join("a.png"), [255, 0, 0]);

        let pipeline = Pipeline::new(&config);
        let mut ledger = Ledger::load(config.ledger_path());
        let result = pipeline.run(&mut ledger, |_| {});

        assert!(matches!(
            result,
            Err(crate::error::ImprintError::Ledger(_))
        ));
    }

    #[test]
    fn test_run_files_reuses_discovered_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_png(&config.paths.input_dir.join("alice").join("a.png"), [255, 0, 0]);
        write_png(&config.paths.input_dir.join("bob").join("b.png"), [0, 255, 0]);

        let pipeline = Pipeline::new(&config);
        let files = pipeline.discover();
        assert_eq!(files.len(), 2);

        let mut ledger = Ledger::load(config.ledger_path());
        let stats = pipeline.run_files(&files, &mut ledger, |_| {}).unwrap();

        assert_eq!(stats.total_files, files.len());
        assert_eq!(stats.converted, 2);
    }
}
