//! Todo command implementation.
//!
//! The `tagcheck todo` command records every current offense in
//! `.tagcheck_todo.yml` and makes the project config inherit it, so the
//! next check starts clean.

use std::path::{Path, PathBuf};

use crate::cli::args::TodoArgs;
use crate::config::schema::EXCLUDE_LIMIT;
use crate::error::Result;
use crate::runner::{self, directory_file_counts};
use crate::todo::{offenses_by_validator, synthesize, SynthesisOptions, TodoWriter, TODO_FILE_NAME};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::{check_threshold_flag, Project};

/// The todo command implementation.
pub struct TodoCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: TodoArgs,
}

impl TodoCommand {
    /// Create a new todo command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: TodoArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    pub fn args(&self) -> &TodoArgs {
        &self.args
    }
}

impl Command for TodoCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if let Some(limit) = self.args.exclude_limit {
            check_threshold_flag("--exclude-limit", EXCLUDE_LIMIT, limit as f64)?;
        }

        let todo_path = self.project_root.join(TODO_FILE_NAME);
        let project = Project::load(
            &self.project_root,
            self.config.as_deref(),
            &[],
            &[todo_path],
        )?;

        let writer = TodoWriter::new(project.root()).with_config_path(project.config_path());
        writer.check_writable(self.args.regenerate)?;

        let candidates = project.candidates(&self.args.paths)?;
        let counts = directory_file_counts(&candidates);
        let source = project.source(self.args.index.as_deref());

        let mut spinner = ui
            .is_interactive()
            .then(|| ui.start_spinner("Collecting offenses..."));
        let result = runner::check(project.store(), project.root(), candidates, source.as_ref());
        if let Some(spinner) = spinner.as_mut() {
            spinner.finish_and_clear();
        }

        for failure in result.failures() {
            ui.warning(&format!(
                "{} could not run and has no suppressions: {}",
                failure.validator, failure.message
            ));
        }

        let store = project.store();
        let options = SynthesisOptions {
            exclude_limit: self.args.exclude_limit.unwrap_or_else(|| store.exclude_limit()),
            collapse_threshold: store.collapse_threshold(),
        };
        let plan = synthesize(
            &offenses_by_validator(result.offenses(), project.root()),
            &counts,
            options,
        );

        let path = writer.write(&plan, self.args.regenerate)?;

        ui.success(&format!(
            "Suppressed {} offense(s) across {} validator(s) in {}",
            result.offenses().len(),
            plan.len(),
            path.display()
        ));
        Ok(CommandResult::success())
    }
}
