//! Check command implementation.
//!
//! The `tagcheck check` command runs every enabled validator and reports
//! the offenses it finds.

use std::path::{Path, PathBuf};

use crate::cli::args::CheckArgs;
use crate::config::schema::MIN_COVERAGE;
use crate::error::{ConfigIssue, Result, TagcheckError};
use crate::output::{HumanFormatter, JsonFormatter, OutputFormat, ReportFormatter};
use crate::report::AggregateResult;
use crate::runner;
use crate::ui::{should_use_colors, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::project::{check_threshold_flag, parse_severity_flag, Project, VcsSelection};

/// Exit code when the check ran but did not pass.
pub const CHECK_FAILED: i32 = 1;

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: CheckArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    pub fn args(&self) -> &CheckArgs {
        &self.args
    }

    fn format(&self) -> Result<OutputFormat> {
        self.args
            .format
            .parse()
            .map_err(|message: String| TagcheckError::InvalidConfig {
                issues: vec![ConfigIssue::new("--format", message)],
            })
    }

    fn selection(&self) -> VcsSelection<'_> {
        if let Some(reference) = self.args.diff.as_deref() {
            VcsSelection::Since(reference)
        } else if self.args.staged {
            VcsSelection::Staged
        } else if self.args.changed {
            VcsSelection::Uncommitted
        } else {
            VcsSelection::All
        }
    }

    fn render(&self, format: OutputFormat, result: &AggregateResult) -> Result<String> {
        let mut out = Vec::new();
        match format {
            OutputFormat::Human => HumanFormatter::new(should_use_colors()).format(result, &mut out)?,
            OutputFormat::Json => JsonFormatter::new().format(result, &mut out)?,
        }
        Ok(String::from_utf8_lossy(&out).trim_end().to_string())
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let format = self.format()?;
        let fail_on = self
            .args
            .fail_on_severity
            .as_deref()
            .map(|value| parse_severity_flag("--fail-on-severity", value))
            .transpose()?;
        if let Some(value) = self.args.min_coverage {
            check_threshold_flag("--min-coverage", MIN_COVERAGE, value)?;
        }

        let project = Project::load(
            &self.project_root,
            self.config.as_deref(),
            &self.args.only,
            &[],
        )?
        .with_overrides(fail_on, self.args.min_coverage);

        let candidates = project.candidates(&self.args.paths)?;
        let candidates = project.restrict_to_vcs(candidates, self.selection())?;
        tracing::debug!("{} candidate file(s)", candidates.len());

        let source = project.source(self.args.index.as_deref());

        let mut spinner = (format == OutputFormat::Human && ui.is_interactive())
            .then(|| ui.start_spinner("Checking documentation..."));
        let result = runner::check(project.store(), project.root(), candidates, source.as_ref());
        if let Some(spinner) = spinner.as_mut() {
            spinner.finish_and_clear();
        }

        ui.message(&self.render(format, &result)?);

        if result.passed() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(CHECK_FAILED))
        }
    }
}
