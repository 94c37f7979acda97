//! Writes the suppression document and links it from the primary config.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_yaml::{Mapping, Value};

use super::synthesizer::{SuppressionEntry, SuppressionPlan};
use crate::config::loader::parse_document;
use crate::config::schema::EXCLUDE;
use crate::config::{CONFIG_FILE_NAME, INHERIT_FROM_KEY};
use crate::error::{Result, TagcheckError};
use crate::validators::ValidatorId;

/// Name of the generated suppression document.
pub const TODO_FILE_NAME: &str = ".tagcheck_todo.yml";

/// Category banners, in document order. Unknown categories follow.
const CATEGORY_ORDER: &[&str] = &["Documentation", "Tags", "Warnings", "Style"];

/// Writes suppression documents for a project.
#[derive(Debug, Clone)]
pub struct TodoWriter {
    root: PathBuf,
    config_path: PathBuf,
}

impl TodoWriter {
    /// Writer for `root`, linking the todo document from `root/.tagcheck.yml`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_path = root.join(CONFIG_FILE_NAME);
        Self { root, config_path }
    }

    /// Link from a different primary config document.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn todo_path(&self) -> PathBuf {
        self.root.join(TODO_FILE_NAME)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Fail unless the todo document may be (re)written.
    pub fn check_writable(&self, regenerate: bool) -> Result<()> {
        let path = self.todo_path();
        if path.exists() && !regenerate {
            return Err(TagcheckError::SuppressionExists { path });
        }
        Ok(())
    }

    /// Write the suppression document and make the primary config inherit
    /// it. Returns the path written.
    pub fn write(&self, plan: &SuppressionPlan, regenerate: bool) -> Result<PathBuf> {
        self.check_writable(regenerate)?;

        let mut plan = plan.clone();
        if self.absorb_primary_excludes(&mut plan)? {
            tracing::info!(
                "Moved Exclude lists from {} into {}",
                self.config_path.display(),
                TODO_FILE_NAME
            );
        }

        let path = self.todo_path();
        fs::write(&path, render(&plan)?)?;
        tracing::info!("Wrote {} suppression(s) to {}", plan.len(), path.display());

        if self.ensure_inherited()? {
            tracing::info!("Added {} to {}", TODO_FILE_NAME, self.config_path.display());
        }

        Ok(path)
    }

    /// Move `Exclude` lists the primary config sets for validators in `plan`
    /// into the plan.
    ///
    /// The primary config is merged on top of the documents it inherits, so
    /// its own `Exclude` would replace the generated one. Returns whether
    /// the primary config changed.
    fn absorb_primary_excludes(&self, plan: &mut SuppressionPlan) -> Result<bool> {
        if !self.config_path.exists() {
            return Ok(false);
        }

        let content = fs::read_to_string(&self.config_path)?;
        let mut document = parse_document(&content, &self.config_path)?;
        let ids: Vec<ValidatorId> = plan.entries().keys().cloned().collect();

        let mut changed = false;
        for id in ids {
            let Some(Value::Mapping(block)) = document.get_mut(id.as_str()) else {
                continue;
            };
            let Some(Value::Sequence(globs)) = block.get(EXCLUDE) else {
                continue;
            };
            let globs: Vec<String> = globs
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();

            plan.absorb_globs(&id, globs);
            block.remove(EXCLUDE);
            if block.is_empty() {
                document.remove(id.as_str());
            }
            changed = true;
        }

        if changed {
            fs::write(&self.config_path, to_yaml(&document)?)?;
        }
        Ok(changed)
    }

    /// Add the todo document to the primary config's `inherit_from`.
    ///
    /// Returns whether the primary config changed. A document that already
    /// inherits the todo file is left alone.
    pub fn ensure_inherited(&self) -> Result<bool> {
        let reference = self.todo_reference();

        if !self.config_path.exists() {
            fs::write(&self.config_path, format!("{}: {}\n", INHERIT_FROM_KEY, reference))?;
            return Ok(true);
        }

        let content = fs::read_to_string(&self.config_path)?;
        let mut document = parse_document(&content, &self.config_path)?;

        let updated = match document.get(INHERIT_FROM_KEY) {
            None => {
                let line = format!("{}: {}\n", INHERIT_FROM_KEY, reference);
                if let Some(updated) = insert_leading_line(&content, &line) {
                    fs::write(&self.config_path, updated)?;
                    return Ok(true);
                }
                vec![Value::String(reference.clone())]
            }
            Some(Value::Null) => vec![Value::String(reference.clone())],
            Some(Value::String(existing)) if *existing == reference => return Ok(false),
            Some(Value::String(existing)) => vec![
                Value::String(existing.clone()),
                Value::String(reference.clone()),
            ],
            Some(Value::Sequence(items)) => {
                if items.iter().any(|i| i.as_str() == Some(reference.as_str())) {
                    return Ok(false);
                }
                let mut items = items.clone();
                items.push(Value::String(reference.clone()));
                items
            }
            Some(_) => {
                return Err(TagcheckError::ConfigParseError {
                    path: self.config_path.clone(),
                    message: format!(
                        "'{}' must be a string or a list of strings",
                        INHERIT_FROM_KEY
                    ),
                })
            }
        };

        document.insert(
            Value::String(INHERIT_FROM_KEY.to_string()),
            Value::Sequence(updated),
        );
        fs::write(&self.config_path, to_yaml(&document)?)?;
        Ok(true)
    }

    /// The todo file as the primary config refers to it.
    fn todo_reference(&self) -> String {
        let todo = self.todo_path();
        let base = self.config_path.parent().unwrap_or(Path::new(""));
        match todo.strip_prefix(base) {
            Ok(relative) => crate::pattern::to_slash(relative),
            Err(_) => todo.display().to_string(),
        }
    }
}

/// Put `line` at the top of the document's body, keeping comments.
///
/// The line goes after a bare `---` start marker when there is one. `None`
/// when the marker carries content on its own line, or the stream holds
/// more than one marker.
fn insert_leading_line(content: &str, line: &str) -> Option<String> {
    let mut markers = content
        .lines()
        .enumerate()
        .filter(|(_, l)| l.starts_with("---"));
    let Some((index, marker)) = markers.next() else {
        return Some(format!("{}\n{}", line, content));
    };
    if marker.trim_end() != "---" || markers.next().is_some() {
        return None;
    }

    let mut out = String::new();
    for (i, l) in content.lines().enumerate() {
        out.push_str(l);
        out.push('\n');
        if i == index {
            out.push_str(line);
        }
    }
    Some(out)
}

fn to_yaml(document: &Mapping) -> Result<String> {
    serde_yaml::to_string(document).map_err(|e| TagcheckError::Other(e.into()))
}

fn category_rank(category: &str) -> usize {
    CATEGORY_ORDER
        .iter()
        .position(|c| *c == category)
        .unwrap_or(CATEGORY_ORDER.len())
}

/// Render the suppression document.
pub fn render(plan: &SuppressionPlan) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "# This file was generated by `{} todo` on {} using {} {}.\n",
        env!("CARGO_PKG_NAME"),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    ));
    out.push_str("# Remove entries as the offenses they suppress are fixed.\n");

    let mut entries: Vec<(&ValidatorId, &SuppressionEntry)> = plan.entries().iter().collect();
    entries.sort_by(|(a, _), (b, _)| {
        category_rank(a.category())
            .cmp(&category_rank(b.category()))
            .then_with(|| a.category().cmp(b.category()))
            .then_with(|| a.as_str().cmp(b.as_str()))
    });

    let mut current: Option<&str> = None;
    for (id, entry) in entries {
        if current != Some(id.category()) {
            out.push_str(&format!("\n# ---- {} ----\n", id.category()));
            current = Some(id.category());
        }

        let mut block = Mapping::new();
        block.insert(
            Value::String(EXCLUDE.to_string()),
            Value::Sequence(entry.globs.iter().cloned().map(Value::String).collect()),
        );
        let mut document = Mapping::new();
        document.insert(Value::String(id.as_str().to_string()), Value::Mapping(block));

        out.push_str(&format!("\n# Offense count: {}\n", entry.offense_count));
        out.push_str(&to_yaml(&document)?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, RawConfig};
    use crate::todo::synthesizer::{synthesize, SynthesisOptions};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn plan(items: &[(&str, &str)]) -> SuppressionPlan {
        let mut offenses: BTreeMap<ValidatorId, Vec<PathBuf>> = BTreeMap::new();
        for (id, file) in items {
            offenses
                .entry(ValidatorId::new(*id))
                .or_default()
                .push(PathBuf::from(file));
        }
        synthesize(&offenses, &BTreeMap::new(), SynthesisOptions::default())
    }

    #[test]
    fn renders_blocks_under_category_banners() {
        let rendered = render(&plan(&[
            ("Style/ExternalTool", "lib/c.rb"),
            ("Tags/Order", "lib/b.rb"),
            ("Documentation/UndocumentedObjects", "lib/a.rb"),
        ]))
        .unwrap();

        let docs = rendered.find("# ---- Documentation ----").unwrap();
        let tags = rendered.find("# ---- Tags ----").unwrap();
        let style = rendered.find("# ---- Style ----").unwrap();
        assert!(docs < tags && tags < style);
        assert!(rendered.starts_with("# This file was generated by `tagcheck todo`"));

        let parsed = RawConfig::from_yaml(&rendered).unwrap();
        let exclude = parsed
            .get("Tags/Order")
            .and_then(|b| b.get(EXCLUDE))
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(exclude[0].as_str(), Some("lib/b.rb"));
    }

    #[test]
    fn refuses_to_overwrite_without_regenerate() {
        let temp = TempDir::new().unwrap();
        let writer = TodoWriter::new(temp.path());
        writer.write(&plan(&[("Tags/Order", "a.rb")]), false).unwrap();

        let again = writer.write(&plan(&[("Tags/Order", "a.rb")]), false);
        assert!(matches!(again, Err(TagcheckError::SuppressionExists { .. })));

        assert!(writer.write(&plan(&[("Tags/Order", "b.rb")]), true).is_ok());
    }

    #[test]
    fn creates_primary_config_when_missing() {
        let temp = TempDir::new().unwrap();
        let writer = TodoWriter::new(temp.path());

        assert!(writer.ensure_inherited().unwrap());
        let content = fs::read_to_string(temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(content, "inherit_from: .tagcheck_todo.yml\n");
    }

    #[test]
    fn inheritance_is_added_once() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config, "# project settings\nTags/Order:\n  Severity: error\n").unwrap();
        let writer = TodoWriter::new(temp.path());

        assert!(writer.ensure_inherited().unwrap());
        assert!(!writer.ensure_inherited().unwrap());

        let content = fs::read_to_string(&config).unwrap();
        assert_eq!(content.matches(TODO_FILE_NAME).count(), 1);
        assert!(content.contains("# project settings"));
    }

    #[test]
    fn inheritance_goes_after_the_document_marker() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config, "# project settings\n---\nTags/Order:\n  Severity: error\n").unwrap();
        let writer = TodoWriter::new(temp.path());

        assert!(writer.ensure_inherited().unwrap());

        let content = fs::read_to_string(&config).unwrap();
        assert_eq!(
            content,
            "# project settings\n---\ninherit_from: .tagcheck_todo.yml\nTags/Order:\n  Severity: error\n"
        );
        let document = parse_document(&content, &config).unwrap();
        assert_eq!(
            document.get(INHERIT_FROM_KEY).and_then(Value::as_str),
            Some(TODO_FILE_NAME)
        );
        assert!(document.get("Tags/Order").is_some());
    }

    #[test]
    fn primary_exclude_moves_into_the_todo_document() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config,
            "Tags/Order:\n  Exclude:\n    - vendor/**/*\nStyle/ExternalTool:\n  Exclude:\n    - tmp/**/*\n  Severity: error\n",
        )
        .unwrap();
        let writer = TodoWriter::new(temp.path());

        writer
            .write(&plan(&[("Tags/Order", "lib/a.rb"), ("Style/ExternalTool", "lib/b.rb")]), false)
            .unwrap();

        let todo = RawConfig::from_yaml(&fs::read_to_string(writer.todo_path()).unwrap()).unwrap();
        let excluded = |id: &str| -> Vec<String> {
            todo.get(id)
                .and_then(|b| b.get(EXCLUDE))
                .and_then(Value::as_sequence)
                .unwrap()
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        };
        assert_eq!(excluded("Tags/Order"), vec!["lib/a.rb", "vendor/**/*"]);
        assert_eq!(excluded("Style/ExternalTool"), vec!["lib/b.rb", "tmp/**/*"]);

        let primary = parse_document(&fs::read_to_string(&config).unwrap(), &config).unwrap();
        assert!(primary.get("Tags/Order").is_none());
        let style = primary.get("Style/ExternalTool").and_then(Value::as_mapping).unwrap();
        assert!(style.get(EXCLUDE).is_none());
        assert_eq!(style.get("Severity").and_then(Value::as_str), Some("error"));
    }

    #[test]
    fn existing_inheritance_list_is_extended() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config, "inherit_from: base.yml\n").unwrap();
        let writer = TodoWriter::new(temp.path());

        assert!(writer.ensure_inherited().unwrap());
        assert!(!writer.ensure_inherited().unwrap());

        let document = parse_document(&fs::read_to_string(&config).unwrap(), &config).unwrap();
        let inherits: Vec<&str> = document
            .get(INHERIT_FROM_KEY)
            .and_then(Value::as_sequence)
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(inherits, vec!["base.yml", TODO_FILE_NAME]);
    }

    #[test]
    fn written_suppressions_are_inherited() {
        let temp = TempDir::new().unwrap();
        let writer = TodoWriter::new(temp.path());
        writer.write(&plan(&[("Tags/Order", "lib/a.rb")]), false).unwrap();

        let loaded = ConfigLoader::default()
            .load(&temp.path().join(CONFIG_FILE_NAME))
            .unwrap();
        assert!(loaded.get("Tags/Order").is_some());
        assert!(loaded.get(INHERIT_FROM_KEY).is_none());
    }
}
