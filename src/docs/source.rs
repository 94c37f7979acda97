//! Where the documentation index comes from.
//!
//! The extraction engine is an external collaborator. It is expected to
//! print one JSON object per line, tagged by `type`:
//!
//! ```text
//! {"type":"object","kind":"method","path":"Cart#add","file":"lib/cart.rb","line":12, ...}
//! {"type":"warning","message":"Unknown tag @foo","file":"lib/cart.rb","line":10}
//! ```
//!
//! Lines that are blank or not valid records are skipped with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{DocIndex, DocObject, ExtractionWarning};
use crate::error::{Result, TagcheckError};
use crate::shell::run_process;

/// Produces the documentation index for a set of files.
pub trait DocumentationSource {
    /// Extract documentation for `files` (relative to `root`).
    fn extract(&self, root: &Path, files: &[PathBuf]) -> Result<DocIndex>;
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum IndexRecord {
    Object(DocObject),
    Warning(ExtractionWarning),
}

/// Parse JSON Lines output into an index.
pub fn parse_index(content: &str) -> DocIndex {
    let mut objects = Vec::new();
    let mut warnings = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<IndexRecord>(line) {
            Ok(IndexRecord::Object(object)) => objects.push(object),
            Ok(IndexRecord::Warning(warning)) => warnings.push(warning),
            Err(e) => tracing::warn!("Skipping index line {}: {}", number + 1, e),
        }
    }

    DocIndex::new(objects, warnings)
}

/// Runs the configured extractor command with the files appended.
#[derive(Debug, Clone)]
pub struct CommandSource {
    command: Vec<String>,
}

impl CommandSource {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl DocumentationSource for CommandSource {
    fn extract(&self, root: &Path, files: &[PathBuf]) -> Result<DocIndex> {
        let Some((program, base_args)) = self.command.split_first() else {
            return Err(TagcheckError::Extraction {
                message: "no ExtractorCommand configured (set AllValidators.ExtractorCommand or pass --index)"
                    .to_string(),
            });
        };

        let mut args: Vec<String> = base_args.to_vec();
        args.extend(files.iter().map(|f| f.display().to_string()));

        let output = run_process(program, &args, root);
        if !output.success() {
            return Err(TagcheckError::Extraction {
                message: format!(
                    "'{}' exited with {}: {}",
                    program,
                    output
                        .exit_code
                        .map_or("no exit code".to_string(), |c| format!("code {}", c)),
                    output.stderr.trim()
                ),
            });
        }

        Ok(parse_index(&output.stdout).relative_to(root))
    }
}

/// Reads a previously extracted index from a file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentationSource for FileSource {
    fn extract(&self, root: &Path, _files: &[PathBuf]) -> Result<DocIndex> {
        let content = fs::read_to_string(&self.path).map_err(|e| TagcheckError::Extraction {
            message: format!("cannot read index {}: {}", self.path.display(), e),
        })?;
        Ok(parse_index(&content).relative_to(root))
    }
}

/// An index built in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    index: DocIndex,
}

impl StaticSource {
    pub fn new(index: DocIndex) -> Self {
        Self { index }
    }
}

impl DocumentationSource for StaticSource {
    fn extract(&self, _root: &Path, _files: &[PathBuf]) -> Result<DocIndex> {
        Ok(self.index.clone())
    }
}
