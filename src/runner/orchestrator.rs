//! Validator invocation.
//!
//! The runner walks the registry in order and, for every enabled validator,
//! resolves its file set and visibility, invokes it and keeps its raw
//! output. A validator that cannot produce output is recorded as a
//! [`ValidatorFailure`] and the run carries on.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::files::FileSelector;
use crate::config::ConfigStore;
use crate::docs::{DocIndex, DocumentationSource};
use crate::shell::run_process;
use crate::validators::style::COMMAND;
use crate::validators::{Execution, QueryContext, ValidatorId};

/// Raw output of one invocation, keyed by the validator that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// The validator that ran (a child id for composite members).
    pub validator: ValidatorId,
    /// Composite parent, when the validator ran as a child.
    pub parent: Option<ValidatorId>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// A validator that could not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorFailure {
    pub validator: ValidatorId,
    pub message: String,
}

/// Everything the runner collected.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// One record per invocation, in invocation order.
    pub records: Vec<RawRecord>,
    pub failures: Vec<ValidatorFailure>,
    /// The documentation index, if any validator needed it and it could
    /// be built.
    pub index: Option<DocIndex>,
    /// Ids of the top-level validators that ran (composite children are
    /// not listed).
    pub ran: Vec<ValidatorId>,
}

/// Runs the enabled validators over a project.
pub struct Runner<'a> {
    store: &'a ConfigStore,
    root: &'a Path,
    source: &'a dyn DocumentationSource,
}

impl<'a> Runner<'a> {
    pub fn new(store: &'a ConfigStore, root: &'a Path, source: &'a dyn DocumentationSource) -> Self {
        Self {
            store,
            root,
            source,
        }
    }

    /// Invoke every enabled validator over the files `selector` allows.
    pub fn run(&self, selector: &FileSelector) -> RunOutcome {
        let registry = self.store.registry();
        let index: OnceCell<Result<DocIndex, String>> = OnceCell::new();
        let mut outcome = RunOutcome::default();

        for spec in registry.iter() {
            let id = spec.id();

            if registry.is_child(id.as_str()) {
                tracing::debug!("{} runs as part of its parent", id);
                continue;
            }
            if !self.store.enabled(id.as_str()) {
                tracing::debug!("{} is disabled", id);
                continue;
            }

            outcome.ran.push(id.clone());

            match spec.execution() {
                Execution::Composite(children) => {
                    let parent_exclude = self.store.exclude_globs(id.as_str());
                    for child in children {
                        let mut exclude = parent_exclude.clone();
                        exclude.extend(self.store.exclude_globs(child.as_str()));
                        let files = selector.select(&exclude);
                        self.invoke(child, Some(id), &files, selector, &index, &mut outcome);
                    }
                }
                _ => {
                    let files = selector.select(&self.store.exclude_globs(id.as_str()));
                    self.invoke(id, None, &files, selector, &index, &mut outcome);
                }
            }
        }

        if let Some(Ok(built)) = index.into_inner() {
            outcome.index = Some(built);
        }

        tracing::info!(
            "Ran {} validator(s), {} failure(s)",
            outcome.ran.len(),
            outcome.failures.len()
        );

        outcome
    }

    fn invoke(
        &self,
        id: &ValidatorId,
        parent: Option<&ValidatorId>,
        files: &BTreeSet<PathBuf>,
        selector: &FileSelector,
        index: &OnceCell<Result<DocIndex, String>>,
        outcome: &mut RunOutcome,
    ) {
        let Some(spec) = self.store.registry().get(id.as_str()) else {
            outcome.failures.push(ValidatorFailure {
                validator: id.clone(),
                message: "validator is not registered".to_string(),
            });
            return;
        };

        tracing::debug!("Running {} over {} file(s)", id, files.len());

        let result = match spec.execution() {
            Execution::Query(query) => {
                let index = index.get_or_init(|| self.build_index(selector));
                match index {
                    Ok(index) => {
                        let ctx = QueryContext {
                            index,
                            files,
                            visibility: self.store.visibility(id.as_str()),
                            settings: self.store.settings_for(id.as_str()),
                        };
                        Ok(RawRecord {
                            validator: id.clone(),
                            parent: parent.cloned(),
                            stdout: query(&ctx).join("\n"),
                            stderr: String::new(),
                            exit_code: Some(0),
                        })
                    }
                    Err(message) => Err(message.clone()),
                }
            }
            Execution::Process => self.run_external(id, parent, files),
            Execution::Composite(_) => Err("nested composite validators are not supported".to_string()),
        };

        match result {
            Ok(record) => outcome.records.push(record),
            Err(message) => {
                tracing::warn!("{} failed: {}", id, message);
                outcome.failures.push(ValidatorFailure {
                    validator: id.clone(),
                    message,
                });
            }
        }
    }

    fn build_index(&self, selector: &FileSelector) -> Result<DocIndex, String> {
        let files: Vec<PathBuf> = selector.globally_in_scope().into_iter().collect();
        tracing::debug!("Extracting documentation for {} file(s)", files.len());
        self.source
            .extract(self.root, &files)
            .map_err(|e| e.to_string())
    }

    fn run_external(
        &self,
        id: &ValidatorId,
        parent: Option<&ValidatorId>,
        files: &BTreeSet<PathBuf>,
    ) -> Result<RawRecord, String> {
        let command = self.store.setting_list(id.as_str(), COMMAND);
        let Some((program, base_args)) = command.split_first() else {
            return Err(format!("no {} configured", COMMAND));
        };

        let mut args: Vec<String> = base_args.to_vec();
        args.extend(self.store.extra_flags(id.as_str()));
        args.extend(files.iter().map(|f| f.display().to_string()));

        let output = run_process(program, &args, self.root);
        if output.crashed() {
            return Err(format!(
                "'{}' failed with {}: {}",
                program,
                output
                    .exit_code
                    .map_or("no exit code".to_string(), |c| format!("exit code {}", c)),
                output.stderr.trim()
            ));
        }

        Ok(RawRecord {
            validator: id.clone(),
            parent: parent.cloned(),
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
        })
    }
}
