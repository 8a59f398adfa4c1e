//! safetidy - sort a folder's files into category subfolders, safely
//!
//! This library provides the pieces of the `safetidy` tool: a safety gate that only
//! approves whitelisted, non-system directories, an extension-based category resolver
//! with user overrides, the executor that moves files (or reports, on a dry run), and an
//! append-only log of every move.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod move_log;
pub mod output;
pub mod path_safety;
pub mod prompt;

pub use config::{ConfigError, OrganizerConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use file_category::{CategoryRuleSet, CustomCategory};
pub use file_organizer::{FileOrganizer, OrganizeReport, OrganizeRequest};
pub use move_log::{MoveLogger, MoveRecord};
pub use path_safety::SafetyPolicy;

pub use cli::{Cli, OrganizeOptions, organize, run};
