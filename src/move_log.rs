/// Append-only audit log of performed moves.
///
/// Every successful real move is written as one line:
///
/// ```text
/// [2025-11-09 14:30:52] Moved: /home/me/Downloads/a.jpg → /home/me/Downloads/Images/a.jpg
/// ```
///
/// The file is opened, appended to and closed for each record, so an interrupted run
/// never leaves a handle open or a half-written history behind.
use chrono::{Local, NaiveDateTime, Timelike};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{OrganizeError, OrganizeResult};

/// Default log file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "organizer.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MOVED_MARKER: &str = "] Moved: ";
const ARROW: &str = " → ";

/// One performed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Local time the move was recorded, second precision.
    pub timestamp: NaiveDateTime,
    /// Absolute path of the file before the move.
    pub source: PathBuf,
    /// Absolute path of the file after the move.
    pub destination: PathBuf,
}

impl MoveRecord {
    /// Creates a record stamped with the current local time.
    pub fn now(source: &Path, destination: &Path) -> Self {
        let now = Local::now().naive_local();
        // Second precision, matching what the log line can hold
        let timestamp = now.with_nanosecond(0).unwrap_or(now);

        Self {
            timestamp,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        }
    }

    /// Parses a line previously produced by `Display`. Returns `None` for anything else.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim_end().strip_prefix('[')?;
        let (stamp, paths) = rest.split_once(MOVED_MARKER)?;
        let (source, destination) = paths.split_once(ARROW)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

        Some(Self {
            timestamp,
            source: PathBuf::from(source),
            destination: PathBuf::from(destination),
        })
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}{}{}{}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            MOVED_MARKER,
            self.source.display(),
            ARROW,
            self.destination.display()
        )
    }
}

/// Writes and reads the move log file.
#[derive(Debug, Clone)]
pub struct MoveLogger {
    path: PathBuf,
}

impl MoveLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record for a completed move.
    ///
    /// The line is written with a single `write_all` on a file opened in append mode.
    ///
    /// # Errors
    ///
    /// Returns `LogWriteFailure` if the file cannot be opened or written. The move itself
    /// is not affected.
    pub fn record(&self, source: &Path, destination: &Path) -> OrganizeResult<MoveRecord> {
        let record = MoveRecord::now(source, destination);
        let line = format!("{}\n", record);

        let to_error = |source: std::io::Error| OrganizeError::LogWriteFailure {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        file.write_all(line.as_bytes()).map_err(to_error)?;

        Ok(record)
    }

    /// Reads every well-formed record in the log, oldest first.
    ///
    /// A missing log yields an empty list; malformed lines are skipped.
    pub fn records(&self) -> OrganizeResult<Vec<MoveRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|source| OrganizeError::LogReadFailure {
                path: self.path.clone(),
                source,
            })?;

        let mut records = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match MoveRecord::parse_line(line) {
                Some(record) => records.push(record),
                None => warn!(
                    "skipping malformed line {} in {}",
                    number + 1,
                    self.path.display()
                ),
            }
        }
        Ok(records)
    }
}

impl Default for MoveLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}
