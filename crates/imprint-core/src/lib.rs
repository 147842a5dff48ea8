//! imprint-core - batch image conversion with an incremental ledger.
//!
//! Walks a tree of author-named folders, converts contained images to RGB
//! JPG (flattening transparency onto white), stamps the author into EXIF
//! Artist/ImageDescription/Copyright, and writes uniquely named outputs.
//! A content-hash-keyed ledger makes repeated runs idempotent: files whose
//! fingerprint is already recorded are skipped.
//!
//! # Architecture
//!
//! ```text
//! Discover -> Fingerprint -> Ledger check -> Decode -> Flatten -> JPG+EXIF -> Record
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use imprint_core::{Config, Ledger, Pipeline};
//!
//! fn main() -> imprint_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::new(&config);
//!     let mut ledger = Ledger::load(config.ledger_path());
//!     let stats = pipeline.run(&mut ledger, |_| {})?;
//!     println!("converted {}, skipped {}", stats.converted, stats.skipped);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, ConvertError, ImprintError, LedgerError, Result};
pub use ledger::{Ledger, ProcessingRecord};
pub use pipeline::{DiscoveredFile, Hasher, Pipeline, UNKNOWN_AUTHOR};
pub use types::{ConvertedImage, FileOutcome, FileStatus, RunStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
