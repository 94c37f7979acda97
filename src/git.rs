//! Version-control queries used to narrow the files to check.
//!
//! Every query returns absolute paths of files that still exist under
//! `root`, sorted and deduplicated.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, TagcheckError};
use crate::shell::run_process;

fn git(root: &Path, args: &[&str]) -> Result<String> {
    let output = run_process("git", args, root);
    if !output.success() {
        return Err(TagcheckError::Git {
            message: format!("git {}: {}", args.join(" "), output.stderr.trim()),
        });
    }
    Ok(output.stdout)
}

fn toplevel(root: &Path) -> Result<PathBuf> {
    let out = git(root, &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(out.trim()))
}

fn collect(root: &Path, listings: &[String]) -> Result<Vec<PathBuf>> {
    let top = toplevel(root)?;
    let root = root.canonicalize()?;
    let top = top.canonicalize().unwrap_or(top);

    let files: BTreeSet<PathBuf> = listings
        .iter()
        .flat_map(|listing| listing.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| top.join(line))
        .filter(|path| path.is_file() && path.starts_with(&root))
        .collect();

    Ok(files.into_iter().collect())
}

/// Files added, copied, modified or renamed since `reference`.
pub fn changed_files_since(root: &Path, reference: &str) -> Result<Vec<PathBuf>> {
    let range = format!("{}...HEAD", reference);
    let listing = git(root, &["diff", "--name-only", "--diff-filter=ACMR", &range])?;
    collect(root, &[listing])
}

/// Files staged for the next commit.
pub fn staged_files(root: &Path) -> Result<Vec<PathBuf>> {
    let listing = git(root, &["diff", "--cached", "--name-only", "--diff-filter=ACMR"])?;
    collect(root, &[listing])
}

/// Files changed in the working tree, plus untracked files.
pub fn uncommitted_files(root: &Path) -> Result<Vec<PathBuf>> {
    let modified = git(root, &["diff", "--name-only", "HEAD"])?;
    let untracked = git(root, &["ls-files", "--others", "--exclude-standard"])?;
    collect(root, &[modified, untracked])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> Option<TempDir> {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let setup: &[&[&str]] = &[
            &["init", "-q"],
            &["config", "user.email", "dev@example.com"],
            &["config", "user.name", "Dev"],
            &["config", "commit.gpgsign", "false"],
        ];
        for args in setup {
            if git(root, args).is_err() {
                return None;
            }
        }
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/a.rb"), "class A; end\n").unwrap();
        git(root, &["add", "."]).ok()?;
        git(root, &["commit", "-q", "-m", "initial"]).ok()?;
        Some(temp)
    }

    #[test]
    fn reports_staged_and_uncommitted_files() {
        let Some(temp) = repo() else {
            return;
        };
        let root = temp.path();
        let canonical = root.canonicalize().unwrap();

        fs::write(root.join("lib/a.rb"), "class A; def x; end; end\n").unwrap();
        fs::write(root.join("lib/b.rb"), "class B; end\n").unwrap();

        let uncommitted = uncommitted_files(root).unwrap();
        assert_eq!(
            uncommitted,
            vec![canonical.join("lib/a.rb"), canonical.join("lib/b.rb")]
        );

        assert!(staged_files(root).unwrap().is_empty());
        git(root, &["add", "lib/b.rb"]).unwrap();
        assert_eq!(staged_files(root).unwrap(), vec![canonical.join("lib/b.rb")]);
    }

    #[test]
    fn reports_files_changed_since_reference() {
        let Some(temp) = repo() else {
            return;
        };
        let root = temp.path();
        let canonical = root.canonicalize().unwrap();

        fs::write(root.join("lib/c.rb"), "class C; end\n").unwrap();
        git(root, &["add", "."]).unwrap();
        git(root, &["commit", "-q", "-m", "second"]).unwrap();

        let changed = changed_files_since(root, "HEAD~1").unwrap();
        assert_eq!(changed, vec![canonical.join("lib/c.rb")]);
    }

    #[test]
    fn outside_a_repository_is_git_error() {
        let temp = TempDir::new().unwrap();
        if run_process("git", &["--version"], temp.path()).success() {
            assert!(matches!(
                staged_files(temp.path()),
                Err(TagcheckError::Git { .. })
            ));
        }
    }
}
