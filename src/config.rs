//! Optional TOML configuration.
//!
//! Nothing is read unless a file is passed with `--config`. The file can add custom
//! categories, extend the allowlist and move the log file:
//!
//! ```toml
//! log_file = "organizer.log"
//!
//! [safety]
//! allowed_directories = ["~/Pictures/inbox"]
//!
//! [[categories]]
//! name = "Notes"
//! extensions = [".md", "org"]
//! ```
//!
//! Categories are applied in file order, before any given on the command line.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::file_category::CustomCategory;
use crate::move_log::DEFAULT_LOG_FILE;
use crate::path_safety::expand_tilde;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("IO error reading configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizerConfig {
    /// Move log location; defaults to `organizer.log` in the working directory.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub categories: Vec<CustomCategory>,
}

/// Allowlist additions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafetyConfig {
    /// Extra allowed directories; `~/` is expanded.
    #[serde(default)]
    pub allowed_directories: Vec<String>,
}

impl OrganizerConfig {
    /// Loads configuration from `config_path`, or returns the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file is missing, unreadable or invalid.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Extra allowed directories with `~` expanded.
    pub fn allowed_directories(&self) -> Vec<PathBuf> {
        self.safety
            .allowed_directories
            .iter()
            .map(|dir| expand_tilde(dir))
            .collect()
    }

    /// Effective log location.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }
}
