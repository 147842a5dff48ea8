//! Content fingerprinting for the incremental-processing ledger.

use blake3::Hasher as Blake3Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Length of the fingerprint prefix embedded in output filenames.
pub const SHORT_FINGERPRINT_LEN: usize = 8;

/// Computes content fingerprints of source files.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 hash of file contents, hex-encoded.
    ///
    /// Uses streaming to handle large files efficiently without loading
    /// the entire file into memory.
    pub fn content_hash(path: &Path) -> std::io::Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Blake3Hasher::new();

        // Use 64KB buffer for efficient reading
        let mut buffer = [0u8; 65536];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Generate a BLAKE3 hash from an in-memory byte buffer.
    ///
    /// Used when the file has already been read (the converter reads each
    /// source once and shares the bytes between hashing and decoding).
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }
}

/// Fixed-length fingerprint prefix used in generated filenames.
pub fn short_fingerprint(fingerprint: &str) -> &str {
    &fingerprint[..SHORT_FINGERPRINT_LEN.min(fingerprint.len())]
}
