//! Turns current offenses into exclusion globs.
//!
//! Offending files are grouped by the directory that contains them. A
//! directory with at least `exclude_limit` files, of which at least
//! `collapse_threshold` are offending, is collapsed into one `dir/**/*`
//! glob. Everything else is listed file by file. Files at the project root
//! are always listed individually.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::schema::{DEFAULT_COLLAPSE_THRESHOLD, DEFAULT_EXCLUDE_LIMIT};
use crate::pattern::to_slash;
use crate::report::Offense;
use crate::validators::ValidatorId;

/// Collapse parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisOptions {
    /// Smallest directory (by file count) that may be collapsed.
    pub exclude_limit: usize,
    /// Offending fraction of a directory's files from which it collapses.
    pub collapse_threshold: f64,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            exclude_limit: DEFAULT_EXCLUDE_LIMIT,
            collapse_threshold: DEFAULT_COLLAPSE_THRESHOLD,
        }
    }
}

/// Suppressions for one validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionEntry {
    /// Relative exclusion globs, sorted.
    pub globs: BTreeSet<String>,
    /// Offenses the globs suppress.
    pub offense_count: usize,
}

/// Validator id to suppression entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionPlan {
    entries: BTreeMap<ValidatorId, SuppressionEntry>,
}

impl SuppressionPlan {
    pub fn entries(&self) -> &BTreeMap<ValidatorId, SuppressionEntry> {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&SuppressionEntry> {
        self.entries.get(&ValidatorId::new(id))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add `globs` to the entry for `id`. Returns false when the plan has
    /// no entry for it.
    pub fn absorb_globs(&mut self, id: &ValidatorId, globs: impl IntoIterator<Item = String>) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.globs.extend(globs);
                true
            }
            None => false,
        }
    }
}

/// Offending files per validator, one entry per offense, relative to
/// `root`.
pub fn offenses_by_validator(offenses: &[Offense], root: &Path) -> BTreeMap<ValidatorId, Vec<PathBuf>> {
    let mut grouped: BTreeMap<ValidatorId, Vec<PathBuf>> = BTreeMap::new();
    for offense in offenses {
        let file = offense.file();
        let relative = file.strip_prefix(root).unwrap_or(file);
        grouped
            .entry(offense.validator().clone())
            .or_default()
            .push(PathBuf::from(to_slash(relative)));
    }
    grouped
}

/// Build the suppression plan.
///
/// `offenses` lists one file per offense for each validator;
/// `directory_counts` is the number of candidate files directly inside
/// each directory.
pub fn synthesize(
    offenses: &BTreeMap<ValidatorId, Vec<PathBuf>>,
    directory_counts: &BTreeMap<PathBuf, usize>,
    options: SynthesisOptions,
) -> SuppressionPlan {
    let mut entries = BTreeMap::new();

    for (id, files) in offenses {
        if files.is_empty() {
            continue;
        }

        let mut by_dir: BTreeMap<PathBuf, BTreeSet<&Path>> = BTreeMap::new();
        for file in files {
            let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
            by_dir.entry(dir).or_default().insert(file.as_path());
        }

        let mut globs = BTreeSet::new();
        for (dir, offending) in by_dir {
            if should_collapse(&dir, offending.len(), directory_counts, options) {
                tracing::debug!("{}: collapsing {}", id, dir.display());
                globs.insert(format!("{}/**/*", to_slash(&dir)));
            } else {
                globs.extend(offending.into_iter().map(to_slash));
            }
        }

        entries.insert(
            id.clone(),
            SuppressionEntry {
                globs,
                offense_count: files.len(),
            },
        );
    }

    SuppressionPlan { entries }
}

fn should_collapse(
    dir: &Path,
    offending: usize,
    directory_counts: &BTreeMap<PathBuf, usize>,
    options: SynthesisOptions,
) -> bool {
    if dir.as_os_str().is_empty() {
        return false;
    }
    let total = directory_counts.get(dir).copied().unwrap_or(offending).max(offending);
    total >= options.exclude_limit && offending as f64 / total as f64 >= options.collapse_threshold
}
