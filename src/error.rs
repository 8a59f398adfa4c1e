//! Error types shared by the organizer.
//!
//! Fatal conditions (`SafetyRejection`, `InvalidRoot`, `ReadDir`, configuration and category
//! problems) are raised before any file is touched. Per-file variants are caught by the
//! executor, reported, and never stop the run.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while validating, planning or executing an organization run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The path is outside every allowed directory or under a system prefix.
    #[error("Rejected: {path} is outside the allowed directories or is a system folder")]
    SafetyRejection { path: PathBuf },

    /// The path passed the safety check but is not an existing directory.
    #[error("Invalid directory: {path}")]
    InvalidRoot { path: PathBuf },

    /// The validated root could not be listed.
    #[error("Error reading directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a category directory.
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a file into its category directory.
    #[error("Failed to move {from} to {to}: {source}")]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The move log could not be appended to.
    #[error("Failed to write to log {path}: {source}")]
    LogWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read log {path}: {source}")]
    LogReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A custom category name that cannot be used as a folder name.
    #[error("Invalid category '{name}': {reason}")]
    InvalidCategory { name: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading an interactive answer failed.
    #[error("Failed to read input: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

impl OrganizeError {
    /// Process exit code for a fatal error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SafetyRejection { .. } => 2,
            Self::InvalidRoot { .. } => 3,
            Self::InvalidCategory { .. } | Self::Config(_) => 4,
            _ => 1,
        }
    }
}
