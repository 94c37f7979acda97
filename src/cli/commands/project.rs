//! Shared setup for commands that run validators.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_yaml::{Number, Value};

use crate::config::suggest::did_you_mean;
use crate::config::validator::range_problem;
use crate::config::{load_config_skipping, ConfigStore, CONFIG_FILE_NAME};
use crate::docs::{CommandSource, DocumentationSource, FileSource};
use crate::error::{ConfigIssue, Result, TagcheckError};
use crate::git;
use crate::runner::{discover_files, restrict_to_targets};
use crate::validators::{builtin, Severity};

/// A loaded project: its root, primary config and resolved settings.
pub struct Project {
    root: PathBuf,
    config_path: Option<PathBuf>,
    store: ConfigStore,
}

impl Project {
    /// Load the configuration for `root`, leaving out the documents in
    /// `skip`.
    pub fn load(
        root: &Path,
        explicit_config: Option<&Path>,
        only: &[String],
        skip: &[PathBuf],
    ) -> Result<Self> {
        let (raw, config_path) = load_config_skipping(root, explicit_config, skip)?;
        let store = ConfigStore::new(&raw, builtin(), only)?;
        Ok(Self {
            root: root.to_path_buf(),
            config_path,
            store,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Apply command-line gate overrides.
    pub fn with_overrides(mut self, fail_on: Option<Severity>, min_coverage: Option<f64>) -> Self {
        self.store = self.store.with_overrides(fail_on, min_coverage);
        self
    }

    /// The primary config document, or where it would be created.
    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }

    /// Candidate files (relative), restricted to `targets` when given.
    ///
    /// # Errors
    ///
    /// Returns `TargetNotFound` for a target that does not exist.
    pub fn candidates(&self, targets: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let targets: Vec<PathBuf> = targets
            .iter()
            .map(|t| if t.is_absolute() { t.clone() } else { self.root.join(t) })
            .collect();
        if let Some(missing) = targets.iter().find(|t| !t.exists()) {
            return Err(TagcheckError::TargetNotFound {
                path: missing.clone(),
            });
        }

        let discovered = discover_files(&self.root, &self.store.include_globs(), &[]);
        Ok(restrict_to_targets(&self.root, discovered, &targets))
    }

    /// Keep only candidates that appear in a version-control selection.
    pub fn restrict_to_vcs(&self, candidates: Vec<PathBuf>, selection: VcsSelection<'_>) -> Result<Vec<PathBuf>> {
        let selected: BTreeSet<PathBuf> = match selection {
            VcsSelection::All => return Ok(candidates),
            VcsSelection::Since(reference) => git::changed_files_since(&self.root, reference)?,
            VcsSelection::Staged => git::staged_files(&self.root)?,
            VcsSelection::Uncommitted => git::uncommitted_files(&self.root)?,
        }
        .into_iter()
        .collect();

        let root = self.root.canonicalize()?;
        Ok(candidates
            .into_iter()
            .filter(|c| selected.contains(&root.join(c)))
            .collect())
    }

    /// Where the documentation index comes from.
    pub fn source(&self, index: Option<&Path>) -> Box<dyn DocumentationSource> {
        match index {
            Some(path) if path.is_absolute() => Box::new(FileSource::new(path)),
            Some(path) => Box::new(FileSource::new(self.root.join(path))),
            None => Box::new(CommandSource::new(self.store.extractor_command())),
        }
    }
}

/// Which version-control changes to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsSelection<'a> {
    All,
    Since(&'a str),
    Staged,
    Uncommitted,
}

/// Parse a severity given on the command line.
pub fn parse_severity_flag(flag: &str, value: &str) -> Result<Severity> {
    value.parse().map_err(|message: String| TagcheckError::InvalidConfig {
        issues: vec![ConfigIssue::new(flag, message)
            .with_suggestion(did_you_mean(value, Severity::NAMES))],
    })
}

/// Check a numeric threshold given on the command line against the range
/// its config key allows.
pub fn check_threshold_flag(flag: &str, key: &str, value: f64) -> Result<()> {
    match range_problem(key, &Value::Number(Number::from(value))) {
        Some(message) => Err(TagcheckError::InvalidConfig {
            issues: vec![ConfigIssue::new(flag, message)],
        }),
        None => Ok(()),
    }
}
