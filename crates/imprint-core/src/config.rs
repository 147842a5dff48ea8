//! Configuration management for imprint.
//!
//! Configuration is loaded from a TOML file with sensible defaults; every
//! struct implements `Default`, so a missing config file means default
//! behavior rather than an error. Defaults reproduce the conventional
//! layout: `input-images/` scanned recursively, JPGs written to `output/`,
//! ledger kept in `processed_files.json`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for imprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input/output/ledger locations
    pub paths: PathsConfig,

    /// Conversion settings
    pub processing: ProcessingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory scanned for author folders
    pub input_dir: PathBuf,

    /// Directory converted JPGs are written to
    pub output_dir: PathBuf,

    /// Path of the persisted processing ledger
    pub ledger_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input-images"),
            output_dir: PathBuf::from("output"),
            ledger_path: PathBuf::from("processed_files.json"),
        }
    }
}

/// Conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Extensions accepted by discovery (matched case-insensitively)
    pub supported_formats: Vec<String>,

    /// JPEG encoding quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "heic".to_string(),
                "heif".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "tif".to_string(),
                "webp".to_string(),
            ],
            jpeg_quality: 95,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (e.g. `~/.config/imprint/` on
    /// Linux), falling back to `~/.imprint/config.toml` if detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "imprint", "imprint")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".imprint").join("config.toml")
            })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.jpeg_quality == 0 || self.processing.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.processing.jpeg_quality
            )));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "supported_formats must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the resolved input directory (with ~ expansion).
    pub fn input_dir(&self) -> PathBuf {
        expand(&self.paths.input_dir)
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        expand(&self.paths.output_dir)
    }

    /// Get the resolved ledger document path (with ~ expansion).
    pub fn ledger_path(&self) -> PathBuf {
        expand(&self.paths.ledger_path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
