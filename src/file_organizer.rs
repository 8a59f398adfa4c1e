/// Planning and executing an organization run.
///
/// Every direct entry of the root goes through one linear pipeline: it is skipped
/// (hidden, not a regular file, or blocked), reported (dry run) or moved into
/// `root/<category>/`. Failures on one file are reported and the run carries on.
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{OrganizeError, OrganizeResult};
use crate::file_category::{CategoryRuleSet, extension_of, is_blocked};
use crate::move_log::MoveLogger;
use crate::path_safety::SafetyPolicy;

/// Everything one run needs: the validated root, the dry-run flag and the rules.
///
/// A request can only be built through [`OrganizeRequest::new`], which runs the
/// safety check, so the executor never sees an unapproved root.
#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    root: PathBuf,
    dry_run: bool,
    rules: CategoryRuleSet,
}

impl OrganizeRequest {
    /// Validates `raw_root` against the policy and builds the request.
    ///
    /// # Errors
    ///
    /// `SafetyRejection` or `InvalidRoot` from [`SafetyPolicy::validate`].
    pub fn new(
        policy: &SafetyPolicy,
        raw_root: &Path,
        dry_run: bool,
        rules: CategoryRuleSet,
    ) -> OrganizeResult<Self> {
        let root = policy.validate(raw_root)?;
        Ok(Self {
            root,
            dry_run,
            rules,
        })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn rules(&self) -> &CategoryRuleSet {
        &self.rules
    }
}

/// A directory entry as seen by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// Normalized extension, empty when the name has none.
    pub extension: String,
    pub hidden: bool,
    pub regular_file: bool,
}

impl FileEntry {
    /// Reads type and hidden state of a directory entry.
    ///
    /// The type check follows symlinks: a link to a regular file counts as a file (the
    /// link itself is what gets moved), a dangling link does not.
    fn from_dir_entry(entry: &DirEntry) -> std::io::Result<Self> {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        let hidden = name.starts_with('.') || has_hidden_attribute(entry)?;

        Ok(Self {
            extension: extension_of(&name),
            regular_file: path.is_file(),
            path,
            hidden,
            name,
        })
    }
}

#[cfg(windows)]
fn has_hidden_attribute(entry: &DirEntry) -> std::io::Result<bool> {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    Ok(entry.metadata()?.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_entry: &DirEntry) -> std::io::Result<bool> {
    Ok(false)
}

/// Why an entry was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Hidden,
    NotAFile,
    Blocked,
}

/// What the planner decided for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    Skip(SkipReason),
    Report { category: String },
    Move { category: String },
}

/// Decides the action for one entry. Pure: touches nothing on disk.
pub fn plan(entry: &FileEntry, request: &OrganizeRequest) -> FileAction {
    if !entry.regular_file {
        return FileAction::Skip(SkipReason::NotAFile);
    }
    if entry.hidden {
        return FileAction::Skip(SkipReason::Hidden);
    }
    if is_blocked(&entry.extension) {
        return FileAction::Skip(SkipReason::Blocked);
    }

    let category = request.rules().category_for(&entry.extension).to_string();
    if request.dry_run() {
        FileAction::Report { category }
    } else {
        FileAction::Move { category }
    }
}

/// A reportable result for one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Dry run: the file would be moved.
    WouldMove { name: String, category: String },
    /// The file was moved.
    Moved {
        name: String,
        category: String,
        destination: PathBuf,
    },
    /// Reading, creating the category folder or moving failed; the file was left alone.
    Failed { name: String, error: OrganizeError },
    /// The move happened but could not be written to the log.
    LogFailed { name: String, error: OrganizeError },
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldMove { name, category } => {
                write!(f, "[DRY RUN] Would move {} → {}/", name, category)
            }
            Self::Moved { name, category, .. } => write!(f, "Moved {} → {}/", name, category),
            Self::Failed { name, error } => write!(f, "Error processing file: {} ({})", name, error),
            Self::LogFailed { name, error } => {
                write!(f, "Moved {} but could not record it: {}", name, error)
            }
        }
    }
}

/// Result of a whole run.
#[derive(Debug)]
pub struct OrganizeReport {
    pub dry_run: bool,
    /// Reported outcomes in processing order. Skipped entries never appear here.
    pub outcomes: Vec<FileOutcome>,
}

impl OrganizeReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            outcomes: Vec::new(),
        }
    }

    pub fn moved_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Moved { .. }))
    }

    pub fn would_move_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::WouldMove { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn log_failure_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::LogFailed { .. }))
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|&o| predicate(o)).count()
    }

    /// Number of moved (or would-be moved) files per category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            if let FileOutcome::WouldMove { category, .. } | FileOutcome::Moved { category, .. } =
                outcome
            {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Final one-line summary.
    pub fn summary_line(&self) -> &'static str {
        if self.dry_run {
            "Dry run complete. No files were moved."
        } else {
            "File organization complete."
        }
    }
}

/// Moves files into category directories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Runs the request, calling `on_outcome` for each reported outcome as it happens.
    ///
    /// Real moves are recorded through `logger`; dry runs never touch the filesystem or
    /// the log.
    ///
    /// # Errors
    ///
    /// Only `ReadDir`, when the root itself cannot be listed. Everything per-file ends up
    /// in the report.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use safetidy::file_category::CategoryRuleSet;
    /// use safetidy::file_organizer::{FileOrganizer, OrganizeRequest};
    /// use safetidy::move_log::MoveLogger;
    /// use safetidy::path_safety::SafetyPolicy;
    /// use std::path::Path;
    ///
    /// let policy = SafetyPolicy::from_environment();
    /// let request = OrganizeRequest::new(
    ///     &policy,
    ///     Path::new("/home/me/Downloads"),
    ///     true,
    ///     CategoryRuleSet::builtin(),
    /// )
    /// .unwrap();
    /// let report = FileOrganizer::run(&request, &MoveLogger::default(), |o| println!("{}", o)).unwrap();
    /// println!("{}", report.summary_line());
    /// ```
    pub fn run(
        request: &OrganizeRequest,
        logger: &MoveLogger,
        mut on_outcome: impl FnMut(&FileOutcome),
    ) -> OrganizeResult<OrganizeReport> {
        let root = request.root();
        let read_dir = fs::read_dir(root).map_err(|source| OrganizeError::ReadDir {
            path: root.to_path_buf(),
            source,
        })?;

        let mut entries: Vec<_> = read_dir.collect();
        entries.sort_by_key(|entry| entry.as_ref().map(|e| e.file_name()).ok());

        // The log may live inside the root when run from there
        let audit_log = fs::canonicalize(logger.path()).ok();

        let mut report = OrganizeReport::new(request.dry_run());
        for entry in entries {
            let outcomes = match entry.and_then(|e| FileEntry::from_dir_entry(&e)) {
                Ok(file) if audit_log.as_deref() == Some(file.path.as_path()) => {
                    debug!("skipping move log {}", file.name);
                    Vec::new()
                }
                Ok(file) => Self::process(request, logger, &file),
                Err(e) => vec![FileOutcome::Failed {
                    name: "<unreadable entry>".to_string(),
                    error: OrganizeError::ReadDir {
                        path: root.to_path_buf(),
                        source: e,
                    },
                }],
            };
            for outcome in outcomes {
                on_outcome(&outcome);
                report.outcomes.push(outcome);
            }
        }

        Ok(report)
    }

    fn process(request: &OrganizeRequest, logger: &MoveLogger, file: &FileEntry) -> Vec<FileOutcome> {
        match plan(file, request) {
            FileAction::Skip(reason) => {
                debug!("skipping {} ({:?})", file.name, reason);
                Vec::new()
            }
            FileAction::Report { category } => vec![FileOutcome::WouldMove {
                name: file.name.clone(),
                category,
            }],
            FileAction::Move { category } => {
                match Self::move_to_category(request.root(), &file.path, &category) {
                    Ok(destination) => {
                        let mut outcomes = Vec::with_capacity(2);
                        let log_result = logger.record(&file.path, &destination);
                        outcomes.push(FileOutcome::Moved {
                            name: file.name.clone(),
                            category,
                            destination,
                        });
                        if let Err(error) = log_result {
                            outcomes.push(FileOutcome::LogFailed {
                                name: file.name.clone(),
                                error,
                            });
                        }
                        outcomes
                    }
                    Err(error) => vec![FileOutcome::Failed {
                        name: file.name.clone(),
                        error,
                    }],
                }
            }
        }
    }

    /// Moves a file into `root/<category>/`, creating the directory if needed.
    ///
    /// A same-named file already in the category directory is replaced.
    ///
    /// # Returns
    ///
    /// The absolute destination path.
    pub fn move_to_category(
        root: &Path,
        file_path: &Path,
        category: &str,
    ) -> OrganizeResult<PathBuf> {
        let category_path = root.join(category);

        if !category_path.is_dir() {
            fs::create_dir_all(&category_path).map_err(|source| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_path.clone(),
                    source,
                }
            })?;
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: category_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;
        let destination = category_path.join(file_name);

        // rename replaces an existing destination file
        fs::rename(file_path, &destination).map_err(|source| OrganizeError::FileMoveFailure {
            from: file_path.to_path_buf(),
            to: destination.clone(),
            source,
        })?;

        Ok(destination)
    }
}
