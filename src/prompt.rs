//! Line-oriented interactive prompts.
//!
//! Yes/no questions accept `Y` or `y` as yes and anything else, including end of
//! input, as no.

use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::PathBuf;

use crate::error::{OrganizeError, OrganizeResult};
use crate::file_category::CustomCategory;
use crate::path_safety::expand_tilde;

/// Asks questions on `output` and reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter bound to the terminal.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints the question and returns the trimmed answer; empty at end of input.
    fn ask(&mut self, question: &str) -> OrganizeResult<String> {
        writeln!(self.output, "{}", question).map_err(OrganizeError::Prompt)?;
        self.output.flush().map_err(OrganizeError::Prompt)?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .map_err(OrganizeError::Prompt)?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&mut self, question: &str) -> OrganizeResult<bool> {
        Ok(self.ask(question)?.eq_ignore_ascii_case("y"))
    }

    /// Asks for the folder to organize. `~` is expanded.
    pub fn root_path(&mut self) -> OrganizeResult<PathBuf> {
        let answer = self.ask("Enter folder path to organize (must be whitelisted):")?;
        Ok(expand_tilde(&answer))
    }

    pub fn dry_run(&mut self) -> OrganizeResult<bool> {
        self.confirm("Do a dry run first? (Y/n):")
    }

    /// Collects custom categories until the user stops answering yes.
    pub fn custom_categories(&mut self) -> OrganizeResult<Vec<CustomCategory>> {
        let mut categories = Vec::new();
        let mut more = self.confirm("Do you want to add custom categories? (Y/n):")?;

        while more {
            let name = self.ask("Enter folder name for the new category:")?;
            let list = self.ask(
                "Enter file extensions for this category (comma separated, e.g. .pdf,.docx):",
            )?;
            categories.push(CustomCategory::from_list(&name, &list));
            more = self.confirm("Add another custom category? (Y/n):")?;
        }

        Ok(categories)
    }
}
