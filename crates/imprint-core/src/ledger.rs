//! The incremental-processing ledger.
//!
//! A single JSON document mapping content fingerprints to processing
//! records. The ledger is what makes repeated runs idempotent: a file whose
//! fingerprint is already present is skipped. Entries are append-only in
//! normal operation; a missing or corrupt document is treated as empty
//! (reprocessing produces duplicate outputs, never data loss).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One entry per source file ever successfully converted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingRecord {
    /// Generated name of the JPG written to the output directory
    pub output_filename: String,

    /// Conversion timestamp, RFC 3339
    pub processed_at: String,
}

/// Persisted mapping from content fingerprint to [`ProcessingRecord`].
///
/// A `BTreeMap` keeps the serialized document in a stable key order, so
/// saving an unchanged ledger is byte-identical.
#[derive(Debug)]
pub struct Ledger {
    entries: BTreeMap<String, ProcessingRecord>,
    path: PathBuf,
}

impl Ledger {
    /// Create an empty ledger backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: BTreeMap::new(),
            path: path.into(),
        }
    }

    /// Load the ledger document at `path`.
    ///
    /// A missing file yields an empty ledger silently; an unreadable or
    /// unparsable document yields an empty ledger with a warning. Neither
    /// case fails the run.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.exists() {
            return Self::new(path);
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, ProcessingRecord>>(
                &content,
            ) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ledger at {:?} is corrupt ({e}) - starting fresh", path);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                tracing::warn!("Cannot read ledger at {:?} ({e}) - starting fresh", path);
                BTreeMap::new()
            }
        };

        Self { entries, path }
    }

    /// Membership test for a content fingerprint.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Insert a new processing record.
    ///
    /// The pipeline never re-records a fingerprint; if a caller does, the
    /// existing entry is overwritten with a warning rather than panicking.
    pub fn record(&mut self, fingerprint: impl Into<String>, record: ProcessingRecord) {
        let fingerprint = fingerprint.into();
        if let Some(previous) = self.entries.insert(fingerprint.clone(), record) {
            tracing::warn!(
                "Fingerprint {fingerprint} re-recorded - previous output {} overwritten",
                previous.output_filename
            );
        }
    }

    /// Persist the full mapping, replacing the previous document atomically.
    ///
    /// Writes to a sibling temp file first and renames it over the target,
    /// so a crash mid-save cannot leave a truncated document behind.
    pub fn save(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| LedgerError::Save {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| LedgerError::Save {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Save {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }

    /// Number of recorded fingerprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(fingerprint, record)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProcessingRecord)> {
        self.entries.iter()
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
