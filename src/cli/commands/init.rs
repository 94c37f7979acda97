//! Init command implementation.
//!
//! The `tagcheck init` command writes a starter `.tagcheck.yml`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::InitArgs;
use crate::config::CONFIG_FILE_NAME;
use crate::error::Result;
use crate::templates::config_template;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The init command implementation.
pub struct InitCommand {
    project_root: PathBuf,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(project_root: &Path, args: InitArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    pub fn args(&self) -> &InitArgs {
        &self.args
    }

    fn template_name(&self) -> &'static str {
        if self.args.strict {
            "strict"
        } else {
            "default"
        }
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let path = self.project_root.join(CONFIG_FILE_NAME);

        if path.exists() && !self.args.force {
            ui.warning(&format!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            ));
            return Ok(CommandResult::failure(1));
        }

        fs::write(&path, config_template(self.template_name())?)?;
        tracing::debug!("Wrote {} template to {}", self.template_name(), path.display());

        ui.success(&format!("Created {}", CONFIG_FILE_NAME));
        ui.message("Run 'tagcheck check' to lint your documentation.");
        Ok(CommandResult::success())
    }
}
