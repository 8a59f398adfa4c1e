//! Output formatting and styling module.
//!
//! All user-facing lines go through [`OutputFormatter`], so colors and symbols are
//! consistent. Colors are dropped automatically when `NO_COLOR` is set.

use colored::*;
use std::collections::BTreeMap;

use crate::file_organizer::FileOutcome;
use crate::move_log::MoveRecord;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use safetidy::output::OutputFormatter;
    /// OutputFormatter::success("File organization complete.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol, on stderr.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a line in dry-run style.
    pub fn dry_run_notice(message: &str) {
        println!("{}", message.yellow());
    }

    /// Prints one per-file outcome: moves and dry-run lines to stdout, failures to stderr.
    pub fn outcome(outcome: &FileOutcome) {
        let line = outcome.to_string();
        match outcome {
            FileOutcome::WouldMove { .. } => Self::dry_run_notice(&line),
            FileOutcome::Moved { .. } => Self::plain(&line),
            FileOutcome::Failed { .. } | FileOutcome::LogFailed { .. } => Self::error(&line),
        }
    }

    /// Prints one move log record.
    pub fn record(record: &MoveRecord) {
        Self::plain(&record.to_string());
    }

    /// Prints a summary table with file counts by category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use safetidy::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!("{:<width$} | {}", "Category".bold(), "Files".bold());
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word(*count)
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files)
        );
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
