//! Documentation objects and the index validators query.
//!
//! The index is produced by an external extraction engine (see
//! [`source`]) and is read-only for the rest of the run.

pub mod source;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pattern::to_slash;

pub use source::{CommandSource, DocumentationSource, FileSource, StaticSource};

/// Kind of a documented code object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Class,
    Module,
    Method,
    Constant,
}

impl ObjectKind {
    /// Lowercase name, as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Class => "class",
            ObjectKind::Module => "module",
            ObjectKind::Method => "method",
            ObjectKind::Constant => "constant",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a code object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Which visibilities a validator inspects. Public objects are always in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityLevel {
    pub protected: bool,
    pub private: bool,
}

impl VisibilityLevel {
    /// Only public objects.
    pub fn public() -> Self {
        Self::default()
    }

    /// Derive the level from a validator's extra flags.
    pub fn from_flags<S: AsRef<str>>(flags: &[S]) -> Self {
        let mut level = Self::default();
        for flag in flags {
            match flag.as_ref() {
                "--private" => level.private = true,
                "--protected" => level.protected = true,
                _ => {}
            }
        }
        level
    }

    /// Whether objects of the given visibility are inspected.
    pub fn includes(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Protected => self.protected,
            Visibility::Private => self.private,
        }
    }
}

/// One tag in a docstring, e.g. `@param name [String] the name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    /// Declared types, `None` when the tag has no `[...]` list.
    #[serde(default)]
    pub types: Option<Vec<String>>,
    /// Parameter or option key the tag refers to.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl DocTag {
    /// A tag with a name only.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: None,
            key: None,
            text: String::new(),
        }
    }

    /// Set the referenced parameter name.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the declared types.
    pub fn with_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

/// A method parameter as declared in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name including any sigil (`*args`, `**opts`, `&block`, `key:`).
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
}

impl Parameter {
    /// Name with sigils and the keyword colon removed.
    pub fn bare_name(&self) -> &str {
        self.name
            .trim_start_matches(['*', '&'])
            .trim_end_matches(':')
    }

    /// Whether this is a block parameter (`&block`).
    pub fn is_block(&self) -> bool {
        self.name.starts_with('&')
    }
}

/// A documented (or undocumented) code object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocObject {
    pub kind: ObjectKind,
    /// Qualified path, e.g. `Shop::Cart#add`.
    pub path: String,
    pub file: PathBuf,
    pub line: usize,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub tags: Vec<DocTag>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl DocObject {
    /// An undocumented public object.
    pub fn new(
        kind: ObjectKind,
        path: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            file: file.into(),
            line,
            visibility: Visibility::Public,
            docstring: String::new(),
            tags: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }

    pub fn with_tag(mut self, tag: DocTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Unqualified name (`add` for `Shop::Cart#add`).
    pub fn name(&self) -> &str {
        self.path
            .rsplit(['#', '.', ':'])
            .next()
            .unwrap_or(&self.path)
    }

    /// Documented: a non-empty docstring or at least one tag.
    pub fn is_documented(&self) -> bool {
        !self.docstring.trim().is_empty() || !self.tags.is_empty()
    }

    /// Whether any tag has the given name.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Tags with the given name.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }
}

/// A warning emitted by the extraction engine while reading docstrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub message: String,
    pub file: PathBuf,
    pub line: usize,
}

/// Every documentation object and warning of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocIndex {
    objects: Vec<DocObject>,
    warnings: Vec<ExtractionWarning>,
}

impl DocIndex {
    pub fn new(objects: Vec<DocObject>, warnings: Vec<ExtractionWarning>) -> Self {
        Self { objects, warnings }
    }

    pub fn objects(&self) -> &[DocObject] {
        &self.objects
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Whether the index holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.warnings.is_empty()
    }

    /// Rewrite absolute file paths under `root` as relative, `/`-separated
    /// paths so they line up with the selected file sets.
    pub fn relative_to(mut self, root: &Path) -> Self {
        let relativize = |file: &mut PathBuf| {
            let relative = to_slash(file.strip_prefix(root).unwrap_or(file.as_path()));
            *file = PathBuf::from(relative);
        };
        for object in &mut self.objects {
            relativize(&mut object.file);
        }
        for warning in &mut self.warnings {
            relativize(&mut warning.file);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_from_flags() {
        let level = VisibilityLevel::from_flags(&["--private"]);
        assert!(level.includes(Visibility::Public));
        assert!(level.includes(Visibility::Private));
        assert!(!level.includes(Visibility::Protected));

        let empty: [&str; 0] = [];
        assert_eq!(VisibilityLevel::from_flags(&empty), VisibilityLevel::public());
    }

    #[test]
    fn object_name_strips_namespace() {
        let method = DocObject::new(ObjectKind::Method, "Shop::Cart#add", "lib/cart.rb", 3);
        assert_eq!(method.name(), "add");

        let singleton = DocObject::new(ObjectKind::Method, "Shop::Cart.build", "lib/cart.rb", 9);
        assert_eq!(singleton.name(), "build");

        let class = DocObject::new(ObjectKind::Class, "Shop::Cart", "lib/cart.rb", 1);
        assert_eq!(class.name(), "Cart");
    }

    #[test]
    fn documented_means_text_or_tags() {
        let object = DocObject::new(ObjectKind::Method, "A#b", "a.rb", 1);
        assert!(!object.is_documented());
        assert!(!object.clone().with_docstring("   ").is_documented());
        assert!(object.clone().with_docstring("Adds").is_documented());
        assert!(object.with_tag(DocTag::new("return")).is_documented());
    }

    #[test]
    fn parameter_bare_name() {
        let param = |name: &str| Parameter {
            name: name.to_string(),
            default: None,
        };
        assert_eq!(param("*args").bare_name(), "args");
        assert_eq!(param("**opts").bare_name(), "opts");
        assert_eq!(param("key:").bare_name(), "key");
        assert!(param("&block").is_block());
    }

    #[test]
    fn relative_to_strips_root() {
        let index = DocIndex::new(
            vec![DocObject::new(ObjectKind::Class, "A", "/project/lib/a.rb", 1)],
            vec![ExtractionWarning {
                message: "Unknown tag @foo".to_string(),
                file: PathBuf::from("/project/lib/a.rb"),
                line: 2,
            }],
        )
        .relative_to(Path::new("/project"));

        assert_eq!(index.objects()[0].file, PathBuf::from("lib/a.rb"));
        assert_eq!(index.warnings()[0].file, PathBuf::from("lib/a.rb"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let object: DocObject = serde_json::from_str(
            r#"{"kind":"method","path":"A#b","file":"a.rb","line":4}"#,
        )
        .unwrap();
        assert_eq!(object.visibility, Visibility::Public);
        assert!(object.tags.is_empty());
    }
}
