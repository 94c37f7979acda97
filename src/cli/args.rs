//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tagcheck - Documentation-quality linter for tag-annotated docstrings.
#[derive(Debug, Parser)]
#[command(name = "tagcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides discovery of .tagcheck.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check documentation (default if no command specified)
    Check(CheckArgs),

    /// Generate a suppression file from the current offenses
    Todo(TodoArgs),

    /// Create a .tagcheck.yml for the project
    Init(InitArgs),

    /// List validators and their resolved settings
    Validators(ValidatorsArgs),
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Files or directories to check (default: the whole project)
    pub paths: Vec<PathBuf>,

    /// Run only these validators (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Output format: human, json
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Check only files changed since this git reference
    #[arg(long, value_name = "REF", conflicts_with_all = ["staged", "changed"])]
    pub diff: Option<String>,

    /// Check only files staged for commit
    #[arg(long, conflicts_with = "changed")]
    pub staged: bool,

    /// Check only uncommitted and untracked files
    #[arg(long)]
    pub changed: bool,

    /// Read the documentation index from a JSON Lines file
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Lowest severity that fails the run (error, warning, convention, never)
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on_severity: Option<String>,

    /// Minimum documentation coverage in percent
    #[arg(long, value_name = "PERCENT")]
    pub min_coverage: Option<f64>,
}

/// Arguments for the `todo` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TodoArgs {
    /// Files or directories to generate suppressions for
    pub paths: Vec<PathBuf>,

    /// Overwrite an existing suppression file
    #[arg(long)]
    pub regenerate: bool,

    /// Smallest directory that may be suppressed as a whole
    #[arg(long, value_name = "N")]
    pub exclude_limit: Option<usize>,

    /// Read the documentation index from a JSON Lines file
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Start from the strict template
    #[arg(long)]
    pub strict: bool,

    /// Overwrite existing configuration
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `validators` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ValidatorsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
