//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{CheckArgs, Cli, Commands};
use crate::error::{Result, TagcheckError};
use crate::ui::UserInterface;

use super::check::CheckCommand;
use super::init::InitCommand;
use super::todo::TodoCommand;
use super::validators::ValidatorsCommand;

/// Exit code for errors that stop a command before it can report.
pub const FATAL_EXIT_CODE: i32 = 2;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config: None,
        }
    }

    /// Use an explicit configuration file instead of discovery.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. Running without a subcommand checks the whole
    /// project.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.project_root;
        let config = self.config.as_deref();

        match &cli.command {
            Some(Commands::Check(args)) => CheckCommand::new(root, config, args.clone()).execute(ui),
            Some(Commands::Todo(args)) => TodoCommand::new(root, config, args.clone()).execute(ui),
            Some(Commands::Init(args)) => InitCommand::new(root, args.clone()).execute(ui),
            Some(Commands::Validators(args)) => {
                ValidatorsCommand::new(root, config, args.clone()).execute(ui)
            }
            None => {
                let args = CheckArgs {
                    format: "human".to_string(),
                    ..Default::default()
                };
                CheckCommand::new(root, config, args).execute(ui)
            }
        }
    }
}

/// Show a fatal error as a labeled block.
pub fn report_error(ui: &mut dyn UserInterface, error: &TagcheckError) {
    match error {
        TagcheckError::InvalidConfig { issues } => {
            let details: Vec<String> = issues.iter().map(ToString::to_string).collect();
            ui.show_error_block("Invalid configuration", &details);
        }
        TagcheckError::ConfigParseError { path, message } => {
            ui.show_error_block(
                "Configuration could not be parsed",
                &[path.display().to_string(), message.clone()],
            );
        }
        other => ui.show_error_block("Error", &[other.to_string()]),
    }
}
