//! Effective per-validator settings.
//!
//! Every setting of a validator is resolved through the same ordered list
//! of lookup sources, first match wins:
//!
//! 1. the validator's own block, if the key is present at all (an empty
//!    list or `null` counts as present)
//! 2. the `AllValidators` block
//! 3. the validator's static default
//!
//! Global-only settings (`FailOnSeverity`, `MinCoverage`, `Include`, ...)
//! are read from `AllValidators` with the built-in global defaults below it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_yaml::{Mapping, Value};

use crate::config::loader::RawConfig;
use crate::config::schema::{
    global_defaults, COLLAPSE_THRESHOLD, DEFAULT_COLLAPSE_THRESHOLD, DEFAULT_EXCLUDE_LIMIT,
    ENABLED, EXCLUDE, EXCLUDE_LIMIT, EXTRACTOR_COMMAND, FAIL_ON_SEVERITY, GLOBAL_KEY, INCLUDE,
    MIN_COVERAGE, OPTIONS, SEVERITY,
};
use crate::config::validator::{validate_config, validate_only};
use crate::docs::VisibilityLevel;
use crate::error::{Result, TagcheckError};
use crate::validators::{Severity, ValidatorRegistry};

/// Which layer supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    /// The validator's own block.
    Validator,
    /// The `AllValidators` block.
    Global,
    /// The validator's static default.
    Default,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingSource::Validator => write!(f, "validator"),
            SettingSource::Global => write!(f, "{}", GLOBAL_KEY),
            SettingSource::Default => write!(f, "default"),
        }
    }
}

const LOOKUP_ORDER: [SettingSource; 3] = [
    SettingSource::Validator,
    SettingSource::Global,
    SettingSource::Default,
];

/// A resolved value and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub value: &'a Value,
    pub source: SettingSource,
}

/// Immutable view of the merged configuration.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    registry: Arc<ValidatorRegistry>,
    global: Mapping,
    blocks: HashMap<String, Mapping>,
    global_defaults: Mapping,
    only: Vec<String>,
    fail_on_override: Option<Severity>,
    min_coverage_override: Option<f64>,
}

impl ConfigStore {
    /// Validate `raw` and wrap it.
    ///
    /// A non-empty `only` list forces the listed validators on and every
    /// other validator off.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` carrying every problem found in the document
    /// and in `only`.
    pub fn new(raw: &RawConfig, registry: Arc<ValidatorRegistry>, only: &[String]) -> Result<Self> {
        let mut issues = validate_config(raw.document(), &registry);
        issues.extend(validate_only(only, &registry));
        if !issues.is_empty() {
            return Err(TagcheckError::InvalidConfig { issues });
        }

        let global = raw
            .get(GLOBAL_KEY)
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default();

        let blocks = raw
            .document()
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                if key == GLOBAL_KEY {
                    return None;
                }
                let block = value.as_mapping().cloned().unwrap_or_default();
                Some((key.to_string(), block))
            })
            .collect();

        Ok(Self {
            registry,
            global,
            blocks,
            global_defaults: global_defaults(),
            only: only.to_vec(),
            fail_on_override: None,
            min_coverage_override: None,
        })
    }

    /// Apply command-line overrides for the pass/fail gates.
    pub fn with_overrides(mut self, fail_on: Option<Severity>, min_coverage: Option<f64>) -> Self {
        if fail_on.is_some() {
            self.fail_on_override = fail_on;
        }
        if min_coverage.is_some() {
            self.min_coverage_override = min_coverage;
        }
        self
    }

    /// The validator catalog this store resolves against.
    pub fn registry(&self) -> &Arc<ValidatorRegistry> {
        &self.registry
    }

    /// The `--only` allow-list (empty when not given).
    pub fn only(&self) -> &[String] {
        &self.only
    }

    fn layer(&self, source: SettingSource, id: &str, key: &str) -> Option<&Value> {
        match source {
            SettingSource::Validator => self.blocks.get(id).and_then(|b| b.get(key)),
            SettingSource::Global => self.global.get(key),
            SettingSource::Default => self.registry.get(id).and_then(|s| s.defaults().get(key)),
        }
    }

    /// Resolve `key` for validator `id`.
    pub fn lookup(&self, id: &str, key: &str) -> Option<Resolved<'_>> {
        LOOKUP_ORDER.iter().find_map(|&source| {
            self.layer(source, id, key)
                .map(|value| Resolved { value, source })
        })
    }

    /// Resolved value of an arbitrary setting.
    pub fn setting(&self, id: &str, key: &str) -> Option<&Value> {
        self.lookup(id, key).map(|r| r.value)
    }

    /// Which layer supplies `key` for `id`.
    pub fn explain(&self, id: &str, key: &str) -> Option<SettingSource> {
        self.lookup(id, key).map(|r| r.source)
    }

    pub fn setting_bool(&self, id: &str, key: &str) -> Option<bool> {
        self.setting(id, key).and_then(Value::as_bool)
    }

    pub fn setting_str(&self, id: &str, key: &str) -> Option<&str> {
        self.setting(id, key).and_then(Value::as_str)
    }

    pub fn setting_list(&self, id: &str, key: &str) -> Vec<String> {
        self.setting(id, key).map(string_list).unwrap_or_default()
    }

    pub fn setting_usize(&self, id: &str, key: &str) -> Option<usize> {
        self.setting(id, key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }

    /// Whether the validator runs.
    pub fn enabled(&self, id: &str) -> bool {
        if !self.only.is_empty() {
            return self.only.iter().any(|o| o == id);
        }
        let Some(spec) = self.registry.get(id) else {
            return false;
        };
        self.setting_bool(id, ENABLED)
            .unwrap_or_else(|| spec.default_enabled())
    }

    /// Severity attached to the validator's offenses.
    pub fn severity(&self, id: &str) -> Severity {
        self.setting_str(id, SEVERITY)
            .and_then(|s| s.parse().ok())
            .or_else(|| self.registry.get(id).map(|s| s.default_severity()))
            .unwrap_or_default()
    }

    /// Exclusion globs resolved for the validator.
    pub fn exclude_globs(&self, id: &str) -> Vec<String> {
        self.setting_list(id, EXCLUDE)
    }

    /// Extra flags resolved for the validator.
    pub fn extra_flags(&self, id: &str) -> Vec<String> {
        self.setting_list(id, OPTIONS)
    }

    /// Visibility derived from the validator's own extra flags.
    pub fn visibility(&self, id: &str) -> VisibilityLevel {
        VisibilityLevel::from_flags(&self.extra_flags(id))
    }

    /// Every declared setting of the validator, resolved.
    pub fn settings_for(&self, id: &str) -> ValidatorSettings {
        let mut values = Mapping::new();
        if let Some(spec) = self.registry.get(id) {
            for key in spec.keys() {
                if let Some(value) = self.setting(id, key) {
                    values.insert(Value::String(key.to_string()), value.clone());
                }
            }
        }
        ValidatorSettings::new(values)
    }

    fn global_setting(&self, key: &str) -> Option<&Value> {
        self.global
            .get(key)
            .or_else(|| self.global_defaults.get(key))
    }

    /// `AllValidators.Exclude`.
    pub fn global_exclude(&self) -> Vec<String> {
        self.global_setting(EXCLUDE)
            .map(string_list)
            .unwrap_or_default()
    }

    /// Visibility from `AllValidators.Options`.
    pub fn global_visibility(&self) -> VisibilityLevel {
        let flags = self
            .global_setting(OPTIONS)
            .map(string_list)
            .unwrap_or_default();
        VisibilityLevel::from_flags(&flags)
    }

    /// Candidate file globs.
    pub fn include_globs(&self) -> Vec<String> {
        self.global_setting(INCLUDE)
            .map(string_list)
            .unwrap_or_default()
    }

    /// Program and arguments of the documentation extractor.
    pub fn extractor_command(&self) -> Vec<String> {
        self.global_setting(EXTRACTOR_COMMAND)
            .map(string_list)
            .unwrap_or_default()
    }

    /// Lowest severity that fails the run.
    pub fn fail_on_severity(&self) -> Severity {
        self.fail_on_override.unwrap_or_else(|| {
            self.global_setting(FAIL_ON_SEVERITY)
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default()
        })
    }

    /// Minimum documentation coverage, if one is required.
    pub fn min_coverage(&self) -> Option<f64> {
        self.min_coverage_override
            .or_else(|| self.global_setting(MIN_COVERAGE).and_then(Value::as_f64))
    }

    /// Directory size from which suppression globs may collapse.
    pub fn exclude_limit(&self) -> usize {
        self.global_setting(EXCLUDE_LIMIT)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_EXCLUDE_LIMIT)
    }

    /// Offending fraction from which suppression globs collapse.
    pub fn collapse_threshold(&self) -> f64 {
        self.global_setting(COLLAPSE_THRESHOLD)
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_COLLAPSE_THRESHOLD)
    }
}

/// Resolved settings of one validator, handed to its query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorSettings {
    values: Mapping,
}

impl ValidatorSettings {
    pub fn new(values: Mapping) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// A list setting; a single string is a one-element list, anything
    /// else (including `null`) is empty.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(string_list).unwrap_or_default()
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn usize(&self, key: &str) -> Option<usize> {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Sequence(items) => items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::Visibility;
    use crate::validators::builtin;

    fn store(yaml: &str) -> ConfigStore {
        let raw = RawConfig::from_yaml(yaml).unwrap();
        ConfigStore::new(&raw, builtin(), &[]).unwrap()
    }

    #[test]
    fn own_block_wins_even_when_empty() {
        let store = store(
            r#"
AllValidators:
  Exclude: ['vendor/**/*']
  Options: ['--private']
Tags/Order:
  Exclude: []
  Options: []
"#,
        );

        assert!(store.exclude_globs("Tags/Order").is_empty());
        assert_eq!(store.explain("Tags/Order", EXCLUDE), Some(SettingSource::Validator));
        assert!(!store.visibility("Tags/Order").includes(Visibility::Private));
    }

    #[test]
    fn global_block_fills_gaps() {
        let store = store("AllValidators:\n  Options: ['--private']\n  Severity: error\n");

        assert!(store.visibility("Tags/Order").includes(Visibility::Private));
        assert_eq!(store.severity("Tags/Order"), Severity::Error);
        assert_eq!(store.explain("Tags/Order", SEVERITY), Some(SettingSource::Global));
    }

    #[test]
    fn static_default_is_last_resort() {
        let store = store("Tags/Order:\n  Enabled: true\n");

        assert_eq!(store.severity("Tags/Order"), Severity::Convention);
        assert_eq!(store.explain("Tags/Order", SEVERITY), Some(SettingSource::Default));
        assert_eq!(store.setting_list("Tags/Order", "EnforcedOrder")[0], "param");
    }

    #[test]
    fn own_visibility_does_not_inherit_when_global_is_empty() {
        let store = store("AllValidators:\n  Options: []\nTags/Order:\n  Options: ['--private']\n");

        assert!(store.visibility("Tags/Order").includes(Visibility::Private));
        assert!(!store.visibility("Tags/TypeSyntax").includes(Visibility::Private));
        assert!(!store.global_visibility().includes(Visibility::Private));
    }

    #[test]
    fn enabled_follows_defaults_and_config() {
        let store = store("Tags/ApiTags:\n  Enabled: true\nTags/Order:\n  Enabled: false\n");

        assert!(store.enabled("Tags/ApiTags"));
        assert!(!store.enabled("Tags/Order"));
        assert!(store.enabled("Tags/TypeSyntax"));
        assert!(!store.enabled("Style/ExternalTool"));
        assert!(!store.enabled("No/Such"));
    }

    #[test]
    fn only_list_overrides_enabled() {
        let raw = RawConfig::from_yaml("Tags/Order:\n  Enabled: false\n").unwrap();
        let store = ConfigStore::new(&raw, builtin(), &["Tags/Order".to_string()]).unwrap();

        assert!(store.enabled("Tags/Order"));
        assert!(!store.enabled("Tags/TypeSyntax"));
    }

    #[test]
    fn invalid_config_collects_issues() {
        let raw = RawConfig::from_yaml("Tags/Ordr: {}\nTags/Order:\n  Severity: fatal\n").unwrap();
        match ConfigStore::new(&raw, builtin(), &["Nope/Nope".to_string()]) {
            Err(TagcheckError::InvalidConfig { issues }) => assert_eq!(issues.len(), 3),
            other => panic!("expected invalid config, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn global_settings_have_defaults() {
        let store = store("");

        assert_eq!(store.fail_on_severity(), Severity::Warning);
        assert_eq!(store.min_coverage(), None);
        assert_eq!(store.exclude_limit(), 15);
        assert_eq!(store.collapse_threshold(), 0.8);
        assert_eq!(store.include_globs(), vec!["**/*.rb"]);
        assert!(store.extractor_command().is_empty());
    }

    #[test]
    fn overrides_replace_global_gates() {
        let store = store("AllValidators:\n  FailOnSeverity: error\n  MinCoverage: 50\n")
            .with_overrides(Some(Severity::Convention), None);

        assert_eq!(store.fail_on_severity(), Severity::Convention);
        assert_eq!(store.min_coverage(), Some(50.0));
    }

    #[test]
    fn settings_for_resolves_every_declared_key() {
        let store = store("AllValidators:\n  Options: ['--protected']\nTags/CollectionType:\n  EnforcedStyle: short\n");
        let settings = store.settings_for("Tags/CollectionType");

        assert_eq!(settings.string("EnforcedStyle").as_deref(), Some("short"));
        assert_eq!(settings.list(OPTIONS), vec!["--protected"]);
        assert_eq!(settings.bool(ENABLED), Some(true));
    }
}
