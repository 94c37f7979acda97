//! Candidate discovery and per-validator file selection.
//!
//! All paths handled here are relative to the project root and use `/`
//! separators, so they can be matched against configuration globs and
//! written into suppression documents unchanged.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::pattern::{to_slash, PatternSet};

/// Directories never descended into during discovery.
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Walk `root` and return every file matching `include` and not matching
/// `exclude`, relative to `root`, sorted.
pub fn discover_files(root: &Path, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
    let include = PatternSet::new(include);
    let exclude = PatternSet::new(exclude);

    let mut skipped = 0usize;
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && e.depth() > 0
                && SKIPPED_DIRS.iter().any(|d| e.file_name() == *d))
        })
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                skipped += 1;
                tracing::debug!("Skipping directory entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?;
            Some(PathBuf::from(to_slash(relative)))
        })
        .filter(|p| include.matches(p) && !exclude.matches(p))
        .collect();

    if skipped > 0 {
        tracing::warn!("Skipped {} unreadable directory entries", skipped);
    }

    files.sort();
    files
}

/// Express explicit targets (files or directories) as relative paths and
/// keep the candidates below them.
pub fn restrict_to_targets(
    root: &Path,
    candidates: Vec<PathBuf>,
    targets: &[PathBuf],
) -> Vec<PathBuf> {
    if targets.is_empty() {
        return candidates;
    }

    let targets: Vec<PathBuf> = targets
        .iter()
        .map(|t| {
            let relative = t.strip_prefix(root).unwrap_or(t.as_path());
            PathBuf::from(to_slash(relative))
        })
        .collect();

    candidates
        .into_iter()
        .filter(|c| {
            targets
                .iter()
                .any(|t| t.as_os_str().is_empty() || c == t || c.starts_with(t))
        })
        .collect()
}

/// Applies global and validator-specific exclusions to the candidate set.
#[derive(Debug, Clone)]
pub struct FileSelector {
    candidates: Vec<PathBuf>,
    global: PatternSet,
}

impl FileSelector {
    /// `candidates` are relative paths; `global_exclude` is
    /// `AllValidators.Exclude`.
    pub fn new(candidates: Vec<PathBuf>, global_exclude: &[String]) -> Self {
        Self {
            candidates,
            global: PatternSet::new(global_exclude),
        }
    }

    /// Every candidate, before any exclusion.
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Candidates surviving the global exclusions.
    pub fn globally_in_scope(&self) -> BTreeSet<PathBuf> {
        self.select(&[])
    }

    /// Candidates surviving the global exclusions and every glob in
    /// `validator_exclude`.
    pub fn select(&self, validator_exclude: &[String]) -> BTreeSet<PathBuf> {
        let own = PatternSet::new(validator_exclude);
        self.candidates
            .iter()
            .filter(|f| !self.global.matches(f) && !own.matches(f))
            .cloned()
            .collect()
    }
}

/// Number of files directly inside each directory (not counting
/// subdirectories). Root-level files are counted under the empty path.
pub fn directory_file_counts(files: &[PathBuf]) -> BTreeMap<PathBuf, usize> {
    let mut counts = BTreeMap::new();
    for file in files {
        let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        *counts.entry(dir).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn discovers_included_files_relative_and_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib/b.rb");
        touch(temp.path(), "lib/a.rb");
        touch(temp.path(), "lib/deep/c.rb");
        touch(temp.path(), "README.md");
        touch(temp.path(), ".git/hooks/x.rb");

        let files = discover_files(temp.path(), &["**/*.rb".to_string()], &[]);

        assert_eq!(files, paths(&["lib/a.rb", "lib/b.rb", "lib/deep/c.rb"]));
    }

    #[test]
    fn discovery_applies_exclusions() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib/a.rb");
        touch(temp.path(), "vendor/x.rb");

        let files = discover_files(
            temp.path(),
            &["**/*.rb".to_string()],
            &["vendor/**/*".to_string()],
        );

        assert_eq!(files, paths(&["lib/a.rb"]));
    }

    #[test]
    fn selector_applies_global_then_validator_exclusions() {
        let selector = FileSelector::new(
            paths(&["lib/a.rb", "lib/b.rb", "spec/a_spec.rb"]),
            &["spec/**/*".to_string()],
        );

        let all = selector.globally_in_scope();
        assert_eq!(all.len(), 2);

        let own = selector.select(&["lib/b.rb".to_string()]);
        assert_eq!(own.into_iter().collect::<Vec<_>>(), paths(&["lib/a.rb"]));
    }

    #[test]
    fn restrict_keeps_files_under_targets() {
        let root = Path::new("/project");
        let candidates = paths(&["lib/a.rb", "lib/deep/b.rb", "app/c.rb"]);

        let kept = restrict_to_targets(
            root,
            candidates.clone(),
            &[PathBuf::from("/project/lib/deep"), PathBuf::from("app/c.rb")],
        );
        assert_eq!(kept, paths(&["lib/deep/b.rb", "app/c.rb"]));

        assert_eq!(restrict_to_targets(root, candidates.clone(), &[]), candidates);
    }

    #[test]
    fn counts_files_per_directory() {
        let counts = directory_file_counts(&paths(&["a.rb", "lib/a.rb", "lib/b.rb", "lib/x/c.rb"]));

        assert_eq!(counts[Path::new("")], 1);
        assert_eq!(counts[Path::new("lib")], 2);
        assert_eq!(counts[Path::new("lib/x")], 1);
    }
}
