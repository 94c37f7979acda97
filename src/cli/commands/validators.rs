//! Validators command implementation.
//!
//! The `tagcheck validators` command lists every registered validator with
//! its resolved `Enabled` and `Severity` settings.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ValidatorsArgs;
use crate::config::schema::{ENABLED, SEVERITY};
use crate::config::{ConfigStore, SettingSource};
use crate::error::Result;
use crate::ui::UserInterface;
use crate::validators::Severity;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

#[derive(Debug, Serialize)]
struct ValidatorRow<'a> {
    id: &'a str,
    description: &'a str,
    enabled: bool,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    #[serde(skip)]
    source: Option<SettingSource>,
}

fn rows(store: &ConfigStore) -> Vec<ValidatorRow<'_>> {
    let registry = store.registry();
    registry
        .iter()
        .map(|spec| {
            let id = spec.id().as_str();
            let parent = registry.parent_of(id).map(|p| p.as_str());
            ValidatorRow {
                id,
                description: spec.description(),
                enabled: match parent {
                    Some(parent) => store.enabled(parent),
                    None => store.enabled(id),
                },
                severity: store.severity(id),
                parent,
                source: store
                    .explain(id, ENABLED)
                    .into_iter()
                    .chain(store.explain(id, SEVERITY))
                    .find(|s| *s != SettingSource::Default),
            }
        })
        .collect()
}

/// The validators command implementation.
pub struct ValidatorsCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: ValidatorsArgs,
}

impl ValidatorsCommand {
    /// Create a new validators command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: ValidatorsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    pub fn args(&self) -> &ValidatorsArgs {
        &self.args
    }
}

impl Command for ValidatorsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config.as_deref(), &[], &[])?;
        let rows = rows(project.store());

        if self.args.json {
            let json = serde_json::to_string_pretty(&rows).map_err(anyhow::Error::from)?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let width = rows.iter().map(|r| r.id.len()).max().unwrap_or(0);
        for row in &rows {
            let state = if row.enabled { "enabled" } else { "disabled" };
            let mut line = format!(
                "{:width$}  {:8}  {:10}  {}",
                row.id,
                state,
                row.severity.as_str(),
                row.description,
                width = width
            );
            if let Some(parent) = row.parent {
                line.push_str(&format!(" (runs under {})", parent));
            }
            if let Some(source) = row.source {
                line.push_str(&format!(" [configured in {}]", source));
            }
            ui.message(&line);
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tagcheck.yml"), config).unwrap();
        temp
    }

    #[test]
    fn lists_resolved_settings() {
        let temp = setup("Tags/Order:\n  Enabled: false\nAllValidators:\n  Severity: error\n");
        let mut ui = MockUI::new();

        ValidatorsCommand::new(temp.path(), None, ValidatorsArgs::default())
            .execute(&mut ui)
            .unwrap();

        let order = ui
            .messages()
            .iter()
            .find(|m| m.starts_with("Tags/Order "))
            .unwrap();
        assert!(order.contains("disabled"));
        assert!(order.contains("error"));
        assert!(order.contains("[configured in validator]"));
        assert!(ui.has_message("(runs under Warnings/Parser)"));
    }

    #[test]
    fn json_lists_every_validator() {
        let temp = setup("");
        let mut ui = MockUI::new();

        ValidatorsCommand::new(temp.path(), None, ValidatorsArgs { json: true })
            .execute(&mut ui)
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), crate::validators::builtin().len());
        let child = list
            .iter()
            .find(|v| v["id"] == "Warnings/UnknownTag")
            .unwrap();
        assert_eq!(child["parent"], "Warnings/Parser");
    }
}
