//! Validator definitions.
//!
//! This module provides the core types for describing validators:
//!
//! - [`ValidatorId`] - `Category/Name` identifier
//! - [`Severity`] - offense severity (`never`, `convention`, `warning`, `error`)
//! - [`ValidatorSpec`] - static metadata, defaults and execution strategy
//! - [`QueryContext`] - what an in-process query validator gets to look at

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::config::schema::{SettingKind, ENABLED, EXCLUDE, OPTIONS, SEVERITY};
use crate::config::ValidatorSettings;
use crate::docs::{DocIndex, DocObject, ExtractionWarning, VisibilityLevel};
use crate::pattern::to_slash;

/// Unique identifier for a validator, always `Category/Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorId(pub String);

impl ValidatorId {
    /// Create a new validator ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The part before the slash.
    pub fn category(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(c, _)| c)
    }

    /// The part after the slash.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, n)| n)
    }

    /// The identifier as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ValidatorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Severity level attached to validators and offenses.
///
/// Ordered from least to most severe. `Never` offenses are reported but
/// never fail a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, never fails the run.
    Never,
    /// Style convention.
    Convention,
    /// Should be addressed.
    #[default]
    Warning,
    /// Must be addressed.
    Error,
}

impl Severity {
    /// Every severity token accepted in configuration.
    pub const NAMES: [&'static str; 4] = ["error", "warning", "convention", "never"];

    /// Configuration token for this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Never => "never",
            Severity::Convention => "convention",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "convention" => Ok(Self::Convention),
            "never" => Ok(Self::Never),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// An in-process query: inspects the documentation index and returns raw
/// output lines (see [`query_line`]).
pub type QueryFn = fn(&QueryContext<'_>) -> Vec<String>;

/// How a validator is invoked.
#[derive(Clone)]
pub enum Execution {
    /// In-process query against the shared documentation index.
    Query(QueryFn),
    /// External process configured through the validator's `Command` setting.
    Process,
    /// Report is the union of the listed children, invoked in this order.
    Composite(Vec<ValidatorId>),
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Execution::Query(_) => f.write_str("Query"),
            Execution::Process => f.write_str("Process"),
            Execution::Composite(children) => f.debug_tuple("Composite").field(children).finish(),
        }
    }
}

/// Static description of a validator.
///
/// The `defaults` mapping is the validator's own default schema: every key
/// a user may set in the validator's block appears here with its default.
#[derive(Debug, Clone)]
pub struct ValidatorSpec {
    id: ValidatorId,
    description: &'static str,
    defaults: Mapping,
    kinds: Vec<(String, SettingKind)>,
    execution: Execution,
}

impl ValidatorSpec {
    /// Start a spec with the common keys (`Enabled: true`,
    /// `Severity: warning`, empty `Exclude` and `Options`).
    pub fn new(id: &str, description: &'static str, execution: Execution) -> Self {
        let mut spec = Self {
            id: ValidatorId::new(id),
            description,
            defaults: Mapping::new(),
            kinds: Vec::new(),
            execution,
        };
        spec.insert(ENABLED, Value::Bool(true), SettingKind::Boolean);
        spec.insert(
            SEVERITY,
            Value::String(Severity::Warning.as_str().to_string()),
            SettingKind::Severity,
        );
        spec.insert(EXCLUDE, Value::Sequence(Vec::new()), SettingKind::StringList);
        spec.insert(OPTIONS, Value::Sequence(Vec::new()), SettingKind::StringList);
        spec
    }

    /// Shorthand for a query validator.
    pub fn query(id: &str, description: &'static str, run: QueryFn) -> Self {
        Self::new(id, description, Execution::Query(run))
    }

    /// Shorthand for a composite validator.
    pub fn composite(id: &str, description: &'static str, children: &[&str]) -> Self {
        let children = children.iter().map(|c| ValidatorId::new(*c)).collect();
        Self::new(id, description, Execution::Composite(children))
    }

    /// Set the default for `Enabled`.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.insert(ENABLED, Value::Bool(enabled), SettingKind::Boolean);
        self
    }

    /// Set the default for `Severity`.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.insert(
            SEVERITY,
            Value::String(severity.as_str().to_string()),
            SettingKind::Severity,
        );
        self
    }

    /// Declare a validator-specific setting; its type is taken from the default.
    pub fn setting(mut self, key: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        let kind = SettingKind::of(&default);
        self.insert(key, default, kind);
        self
    }

    /// Declare a list-of-strings setting.
    pub fn list_setting(mut self, key: &str, default: &[&str]) -> Self {
        let items = default
            .iter()
            .map(|s| Value::String((*s).to_string()))
            .collect();
        self.insert(key, Value::Sequence(items), SettingKind::StringList);
        self
    }

    /// Declare a string setting restricted to fixed choices.
    pub fn choice_setting(
        mut self,
        key: &str,
        default: &str,
        choices: &'static [&'static str],
    ) -> Self {
        self.insert(
            key,
            Value::String(default.to_string()),
            SettingKind::Choice(choices),
        );
        self
    }

    fn insert(&mut self, key: &str, value: Value, kind: SettingKind) {
        self.defaults.insert(Value::String(key.to_string()), value);
        self.kinds.retain(|(k, _)| k != key);
        self.kinds.push((key.to_string(), kind));
    }

    /// Validator identifier.
    pub fn id(&self) -> &ValidatorId {
        &self.id
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Static defaults for every key of this validator's block.
    pub fn defaults(&self) -> &Mapping {
        &self.defaults
    }

    /// Declared type of a setting key, if the key is known.
    pub fn kind_of(&self, key: &str) -> Option<SettingKind> {
        self.kinds.iter().find(|(k, _)| k == key).map(|(_, kind)| *kind)
    }

    /// Every key this validator accepts.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|(k, _)| k.as_str())
    }

    /// Default for `Enabled`.
    pub fn default_enabled(&self) -> bool {
        self.defaults
            .get(ENABLED)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Default for `Severity`.
    pub fn default_severity(&self) -> Severity {
        self.defaults
            .get(SEVERITY)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// How the validator runs.
    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    /// Children, if this is a composite validator.
    pub fn children(&self) -> &[ValidatorId] {
        match &self.execution {
            Execution::Composite(children) => children,
            _ => &[],
        }
    }
}

/// Everything an in-process query may look at.
pub struct QueryContext<'a> {
    /// Shared, read-only documentation index for the whole run.
    pub index: &'a DocIndex,
    /// Files in scope for this validator (relative, `/`-normalized).
    pub files: &'a BTreeSet<PathBuf>,
    /// Which visibilities this validator inspects.
    pub visibility: VisibilityLevel,
    /// Resolved settings of this validator.
    pub settings: ValidatorSettings,
}

impl<'a> QueryContext<'a> {
    /// Objects in scope: in an in-scope file and at a visible level.
    pub fn objects(&self) -> impl Iterator<Item = &'a DocObject> + '_ {
        self.index.objects().iter().filter(move |o| {
            self.visibility.includes(o.visibility) && self.in_scope(&o.file)
        })
    }

    /// Extraction warnings for in-scope files.
    pub fn warnings(&self) -> impl Iterator<Item = &'a ExtractionWarning> + '_ {
        self.index
            .warnings()
            .iter()
            .filter(move |w| self.in_scope(&w.file))
    }

    fn in_scope(&self, file: &std::path::Path) -> bool {
        self.files.contains(file) || self.files.contains(&PathBuf::from(to_slash(file)))
    }
}

/// Render one query finding in the canonical tab-separated form
/// `file<TAB>line<TAB>object<TAB>message`.
pub fn query_line(object: &DocObject, message: impl fmt::Display) -> String {
    let message = message.to_string().replace(['\t', '\n'], " ");
    format!(
        "{}\t{}\t{}\t{}",
        to_slash(&object.file),
        object.line,
        object.path,
        message
    )
}
