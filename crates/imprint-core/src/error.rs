//! Error types for the imprint conversion pipeline.
//!
//! Per-file conversion errors carry the offending path so a batch run can
//! report exactly which source file failed; ledger persistence errors are
//! kept separate because they escalate past the per-file boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for imprint operations.
#[derive(Error, Debug)]
pub enum ImprintError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-file conversion errors
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Ledger persistence errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors converting a single source image.
///
/// All variants abort only the file they name, never the batch.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Source file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Source bytes are not a decodable image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Format recognized but not supported by this build
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// JPEG encoding failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Output file could not be written
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Ledger persistence errors.
///
/// Load failures are recovered internally (an empty ledger is substituted),
/// so only save-side failures surface here. A failed save compromises the
/// incremental-processing guarantee and is fatal for the run.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to serialize the ledger document
    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to persist the ledger document
    #[error("Failed to save ledger to {path}: {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience type alias for imprint results.
pub type Result<T> = std::result::Result<T, ImprintError>;
