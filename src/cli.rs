//! Command-line interface module for safetidy.
//!
//! This module handles:
//! - Argument parsing
//! - The interactive prompt flow when no path is given
//! - Orchestrating validation, rule building and the organization run
//! - Printing the move history

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::OrganizerConfig;
use crate::error::OrganizeResult;
use crate::file_category::{CategoryRuleSet, CustomCategory};
use crate::file_organizer::{FileOrganizer, OrganizeReport, OrganizeRequest};
use crate::move_log::MoveLogger;
use crate::output::OutputFormatter;
use crate::path_safety::{SafetyPolicy, expand_tilde};
use crate::prompt::Prompter;

/// Sort files in a whitelisted folder into category subfolders
#[derive(Debug, Parser)]
#[command(name = "safetidy")]
#[command(version, about)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub organize: OrganizeArgs,

    /// Load settings from a TOML file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Move log location (default: ./organizer.log)
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the most recent recorded moves
    History {
        /// Number of records to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

/// Arguments for an organization run.
#[derive(Debug, Default, clap::Args)]
pub struct OrganizeArgs {
    /// Folder to organize; prompts interactively when omitted.
    /// A relative folder named `history` must be written as `./history`
    pub path: Option<String>,

    /// Report what would be moved without moving anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Custom category, e.g. Notes=md,org (repeatable)
    #[arg(short, long = "category", value_name = "NAME=EXTS")]
    pub categories: Vec<String>,
}

/// Fully resolved input for one organization run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub root: PathBuf,
    pub dry_run: bool,
    /// Applied in order after the built-in table.
    pub categories: Vec<CustomCategory>,
}

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns fatal errors only: rejected or invalid roots, bad configuration or
/// categories, unreadable input. Per-file problems are printed and do not fail the run.
pub fn run(cli: Cli) -> OrganizeResult<()> {
    let config = OrganizerConfig::load(cli.config.as_deref())?;
    let logger = MoveLogger::new(cli.log_file.clone().unwrap_or_else(|| config.log_path()));
    debug!("move log: {}", logger.path().display());

    match cli.command {
        Some(Command::History { limit }) => show_history(&logger, limit),
        None => {
            let policy = SafetyPolicy::from_environment()
                .with_allowed_directories(config.allowed_directories());
            debug!("allowed directories: {:?}", policy.allowed_directories());
            debug!("dangerous prefixes: {:?}", policy.dangerous_prefixes());

            let options = match cli.organize.path {
                Some(ref raw) => options_from_args(&cli.organize, expand_tilde(raw), &config)?,
                None => options_from_prompts(&policy, &config, &mut Prompter::stdio())?,
            };
            organize(&options, &policy, &logger).map(|_| ())
        }
    }
}

fn options_from_args(
    args: &OrganizeArgs,
    root: PathBuf,
    config: &OrganizerConfig,
) -> OrganizeResult<OrganizeOptions> {
    let mut categories = config.categories.clone();
    for assignment in &args.categories {
        categories.push(CustomCategory::parse_assignment(assignment)?);
    }

    Ok(OrganizeOptions {
        root,
        dry_run: args.dry_run,
        categories,
    })
}

/// Interactive flow: the root is checked before any further question is asked.
fn options_from_prompts<R, W>(
    policy: &SafetyPolicy,
    config: &OrganizerConfig,
    prompter: &mut Prompter<R, W>,
) -> OrganizeResult<OrganizeOptions>
where
    R: std::io::BufRead,
    W: std::io::Write,
{
    let root = prompter.root_path()?;
    policy.validate(&root)?;

    let dry_run = prompter.dry_run()?;
    let mut categories = config.categories.clone();
    categories.extend(prompter.custom_categories()?);

    Ok(OrganizeOptions {
        root,
        dry_run,
        categories,
    })
}

/// Validates the root, builds the rule set and organizes, printing as it goes.
///
/// # Examples
///
/// ```no_run
/// use safetidy::cli::{organize, OrganizeOptions};
/// use safetidy::move_log::MoveLogger;
/// use safetidy::path_safety::SafetyPolicy;
/// use std::path::PathBuf;
///
/// let options = OrganizeOptions {
///     root: PathBuf::from("/home/me/Downloads"),
///     dry_run: true,
///     categories: Vec::new(),
/// };
/// let report = organize(&options, &SafetyPolicy::from_environment(), &MoveLogger::default());
/// ```
pub fn organize(
    options: &OrganizeOptions,
    policy: &SafetyPolicy,
    logger: &MoveLogger,
) -> OrganizeResult<OrganizeReport> {
    let rules = CategoryRuleSet::build(&options.categories)?;
    for (ext, owners) in rules.duplicate_extensions() {
        OutputFormatter::warning(&format!(
            "Extension {} is listed under {}; files go to {}",
            ext,
            owners.join(", "),
            owners[0]
        ));
    }

    let request = OrganizeRequest::new(policy, &options.root, options.dry_run, rules)?;
    if request.dry_run() {
        OutputFormatter::info(&format!(
            "DRY RUN: Analyzing contents of: {}",
            request.root().display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing contents of: {}",
            request.root().display()
        ));
    }

    let report = FileOrganizer::run(&request, logger, OutputFormatter::outcome)?;

    let counts = report.category_counts();
    if !counts.is_empty() {
        OutputFormatter::summary_table(&counts, counts.values().sum());
    }
    if report.failed_count() > 0 {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    }
    if report.log_failure_count() > 0 {
        OutputFormatter::warning(&format!(
            "Some moves are missing from {}.",
            logger.path().display()
        ));
    }
    OutputFormatter::success(report.summary_line());

    Ok(report)
}

/// Prints the last `limit` records of the move log.
pub fn show_history(logger: &MoveLogger, limit: usize) -> OrganizeResult<()> {
    let records = logger.records()?;
    if records.is_empty() {
        OutputFormatter::info(&format!(
            "No moves recorded in {}",
            logger.path().display()
        ));
        return Ok(());
    }

    let start = records.len().saturating_sub(limit);
    for record in &records[start..] {
        OutputFormatter::record(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrganizeError;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_parse_organize_args() {
        let cli = Cli::try_parse_from([
            "safetidy",
            "~/Downloads",
            "--dry-run",
            "-c",
            "Notes=md,org",
            "--category",
            "Books=epub",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.organize.path.as_deref(), Some("~/Downloads"));
        assert!(cli.organize.dry_run);
        assert_eq!(cli.organize.categories, vec!["Notes=md,org", "Books=epub"]);
    }

    #[test]
    fn test_parse_history() {
        let cli =
            Cli::try_parse_from(["safetidy", "history", "-n", "5", "--log-file", "x.log"]).unwrap();
        assert!(matches!(cli.command, Some(Command::History { limit: 5 })));
        assert_eq!(cli.log_file, Some(PathBuf::from("x.log")));
    }

    #[test]
    fn test_history_named_folder_needs_dot_slash() {
        let cli = Cli::try_parse_from(["safetidy", "history"]).unwrap();
        assert!(matches!(cli.command, Some(Command::History { .. })));

        let cli = Cli::try_parse_from(["safetidy", "./history"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.organize.path.as_deref(), Some("./history"));
    }

    #[test]
    fn test_options_from_args_orders_categories() {
        let config = OrganizerConfig {
            categories: vec![CustomCategory::from_list("Notes", "md")],
            ..Default::default()
        };
        let args = OrganizeArgs {
            path: None,
            dry_run: true,
            categories: vec!["Notes=org".to_string()],
        };

        let options = options_from_args(&args, PathBuf::from("/r"), &config).unwrap();
        assert_eq!(options.categories.len(), 2);
        let rules = CategoryRuleSet::build(&options.categories).unwrap();
        assert_eq!(rules.resolve(".org"), Some("Notes"));
        assert_eq!(rules.resolve(".md"), None);
    }

    #[test]
    fn test_options_from_args_rejects_bad_category() {
        let args = OrganizeArgs {
            path: None,
            dry_run: false,
            categories: vec!["Notes".to_string()],
        };
        let result = options_from_args(&args, PathBuf::from("/r"), &OrganizerConfig::default());
        assert!(matches!(result, Err(OrganizeError::InvalidCategory { .. })));
    }

    #[test]
    fn test_prompt_flow_rejects_before_further_questions() {
        let temp = TempDir::new().unwrap();
        let policy = SafetyPolicy::new(std::iter::empty::<PathBuf>(), ["/etc"]);
        let input = format!("{}\nY\n", temp.path().display());
        let mut prompter = Prompter::new(Cursor::new(input.into_bytes()), Vec::new());

        let result = options_from_prompts(&policy, &OrganizerConfig::default(), &mut prompter);
        assert!(matches!(result, Err(OrganizeError::SafetyRejection { .. })));
    }

    #[test]
    fn test_prompt_flow_collects_everything() {
        let temp = TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        let policy = SafetyPolicy::new([&root], ["/etc"]);
        let input = format!("{}\nY\nY\nNotes\nmd\nn\n", root.display());
        let mut prompter = Prompter::new(Cursor::new(input.into_bytes()), Vec::new());

        let options =
            options_from_prompts(&policy, &OrganizerConfig::default(), &mut prompter).unwrap();
        assert_eq!(options.root, root);
        assert!(options.dry_run);
        assert_eq!(options.categories, vec![CustomCategory::from_list("Notes", "md")]);
    }

    #[test]
    fn test_show_history_on_empty_log() {
        let temp = TempDir::new().unwrap();
        let logger = MoveLogger::new(temp.path().join("organizer.log"));
        assert!(show_history(&logger, 10).is_ok());
    }
}
