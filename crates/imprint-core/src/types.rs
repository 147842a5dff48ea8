//! Core data types for the imprint conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Descriptor of a successfully converted image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedImage {
    /// Generated unique filename of the written JPG
    pub output_filename: String,

    /// Output width in pixels (identical to the source)
    pub width: u32,

    /// Output height in pixels (identical to the source)
    pub height: u32,

    /// Size of the written JPG in bytes
    pub bytes_written: u64,
}

/// Per-file outcome reported during a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Source file path
    pub path: PathBuf,

    /// What happened to this file
    pub status: FileStatus,
}

/// Outcome classification for a single candidate file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileStatus {
    /// Converted and recorded in the ledger
    Converted {
        /// Name of the written output file
        output_filename: String,
    },

    /// Fingerprint already present in the ledger
    Skipped,

    /// Conversion failed; the batch continued
    Failed {
        /// Human-readable error description
        error: String,
    },
}

/// Aggregate statistics for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunStats {
    /// Files converted and recorded this run
    pub converted: usize,

    /// Files skipped because their fingerprint was already in the ledger
    pub skipped: usize,

    /// Files that failed to convert
    pub failed: usize,

    /// Total candidate files discovered
    pub total_files: usize,

    /// Total bytes of source files converted this run
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_serde_tagging() {
        let outcome = FileOutcome {
            path: PathBuf::from("/photos/alice/a.png"),
            status: FileStatus::Converted {
                output_filename: "alice_20240601_120000_a_deadbeef.jpg".to_string(),
            },
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"kind\":\"converted\""));

        let skipped = FileStatus::Skipped;
        let json = serde_json::to_string(&skipped).unwrap();
        assert!(json.contains("\"kind\":\"skipped\""));
    }

    #[test]
    fn test_run_stats_default_is_zeroed() {
        let stats = RunStats::default();
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_bytes, 0);
    }
}
