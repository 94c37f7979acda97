//! Configuration keys and setting types.
//!
//! Every key a configuration document may contain is declared either here
//! (the `AllValidators` block) or in a validator's default schema. The
//! [`SettingKind`] of a key is inferred from its default value and used to
//! type-check user input.

use serde_yaml::{Mapping, Value};

use crate::validators::Severity;

/// Top-level block holding settings shared by every validator.
pub const GLOBAL_KEY: &str = "AllValidators";

/// Whether a validator runs.
pub const ENABLED: &str = "Enabled";
/// Severity attached to a validator's offenses.
pub const SEVERITY: &str = "Severity";
/// Exclusion globs.
pub const EXCLUDE: &str = "Exclude";
/// Extra flags passed to the validator (`--private`, `--protected`, ...).
pub const OPTIONS: &str = "Options";
/// Lowest severity that fails the run.
pub const FAIL_ON_SEVERITY: &str = "FailOnSeverity";
/// Minimum documentation coverage percentage.
pub const MIN_COVERAGE: &str = "MinCoverage";
/// Directory size from which suppression globs may collapse.
pub const EXCLUDE_LIMIT: &str = "ExcludeLimit";
/// Offending fraction from which suppression globs collapse.
pub const COLLAPSE_THRESHOLD: &str = "CollapseThreshold";
/// Candidate file globs.
pub const INCLUDE: &str = "Include";
/// Program and arguments producing the documentation index.
pub const EXTRACTOR_COMMAND: &str = "ExtractorCommand";

/// Default for `ExcludeLimit`.
pub const DEFAULT_EXCLUDE_LIMIT: usize = 15;
/// Default for `CollapseThreshold`.
pub const DEFAULT_COLLAPSE_THRESHOLD: f64 = 0.8;
/// Default for `Include`.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.rb"];

/// Type of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Boolean,
    Integer,
    Number,
    String,
    StringList,
    Severity,
    Choice(&'static [&'static str]),
    Mapping,
    Any,
}

impl SettingKind {
    /// Infer a kind from a default value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Sequence(_) => Self::StringList,
            Value::Mapping(_) => Self::Mapping,
            _ => Self::Any,
        }
    }

    /// What the kind expects, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Boolean => "a boolean".to_string(),
            Self::Integer => "an integer".to_string(),
            Self::Number => "a number".to_string(),
            Self::String => "a string".to_string(),
            Self::StringList => "a list of strings".to_string(),
            Self::Severity => format!("one of {}", Severity::NAMES.join(", ")),
            Self::Choice(choices) => format!("one of {}", choices.join(", ")),
            Self::Mapping => "a mapping".to_string(),
            Self::Any => "any value".to_string(),
        }
    }

    /// Check a value against this kind.
    ///
    /// `null` is accepted for every kind; it clears an inherited value.
    /// Enumerated kinds (severity, choice) only check the value is a string;
    /// the token itself is checked separately so it can get a suggestion.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let ok = match (self, value) {
            (_, Value::Null) | (Self::Any, _) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Number, Value::Number(_)) => true,
            (Self::String | Self::Severity | Self::Choice(_), Value::String(_)) => true,
            (Self::StringList, Value::Sequence(items)) => items.iter().all(Value::is_string),
            (Self::Mapping, Value::Mapping(_)) => true,
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(format!(
                "expected {}, got {}",
                self.describe(),
                type_name(value)
            ))
        }
    }

    /// Allowed tokens for enumerated kinds.
    pub fn tokens(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Severity => Some(&Severity::NAMES),
            Self::Choice(choices) => Some(choices),
            _ => None,
        }
    }
}

/// YAML type name of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Keys accepted in the `AllValidators` block, with their kinds.
pub fn global_kinds() -> Vec<(&'static str, SettingKind)> {
    vec![
        (ENABLED, SettingKind::Boolean),
        (SEVERITY, SettingKind::Severity),
        (EXCLUDE, SettingKind::StringList),
        (OPTIONS, SettingKind::StringList),
        (FAIL_ON_SEVERITY, SettingKind::Severity),
        (MIN_COVERAGE, SettingKind::Number),
        (EXCLUDE_LIMIT, SettingKind::Integer),
        (COLLAPSE_THRESHOLD, SettingKind::Number),
        (INCLUDE, SettingKind::StringList),
        (EXTRACTOR_COMMAND, SettingKind::StringList),
    ]
}

/// Defaults for the global-only keys.
///
/// `Enabled`, `Severity` and `Options` have no global default: when the
/// global block omits them, validators fall back to their own defaults.
pub fn global_defaults() -> Mapping {
    let mut defaults = Mapping::new();
    let mut set = |key: &str, value: Value| {
        defaults.insert(Value::String(key.to_string()), value);
    };
    set(EXCLUDE, Value::Sequence(Vec::new()));
    set(
        FAIL_ON_SEVERITY,
        Value::String(Severity::Warning.as_str().to_string()),
    );
    set(EXCLUDE_LIMIT, Value::from(DEFAULT_EXCLUDE_LIMIT as u64));
    set(COLLAPSE_THRESHOLD, Value::from(DEFAULT_COLLAPSE_THRESHOLD));
    set(
        INCLUDE,
        Value::Sequence(
            DEFAULT_INCLUDE
                .iter()
                .map(|g| Value::String((*g).to_string()))
                .collect(),
        ),
    );
    set(EXTRACTOR_COMMAND, Value::Sequence(Vec::new()));
    defaults
}

/// Keys that are only meaningful in the `AllValidators` block.
pub fn is_global_only(key: &str) -> bool {
    matches!(
        key,
        FAIL_ON_SEVERITY
            | MIN_COVERAGE
            | EXCLUDE_LIMIT
            | COLLAPSE_THRESHOLD
            | INCLUDE
            | EXTRACTOR_COMMAND
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn kind_is_inferred_from_default() {
        assert_eq!(SettingKind::of(&yaml("true")), SettingKind::Boolean);
        assert_eq!(SettingKind::of(&yaml("15")), SettingKind::Integer);
        assert_eq!(SettingKind::of(&yaml("0.8")), SettingKind::Number);
        assert_eq!(SettingKind::of(&yaml("long")), SettingKind::String);
        assert_eq!(SettingKind::of(&yaml("[a]")), SettingKind::StringList);
    }

    #[test]
    fn check_reports_expected_and_actual() {
        let err = SettingKind::Boolean.check(&yaml("yes please")).unwrap_err();
        assert_eq!(err, "expected a boolean, got string");

        let err = SettingKind::StringList.check(&yaml("'lib/**'")).unwrap_err();
        assert_eq!(err, "expected a list of strings, got string");
    }

    #[test]
    fn check_rejects_non_string_list_items() {
        assert!(SettingKind::StringList.check(&yaml("[a, 1]")).is_err());
        assert!(SettingKind::StringList.check(&yaml("[a, b]")).is_ok());
    }

    #[test]
    fn null_is_always_accepted() {
        assert!(SettingKind::Boolean.check(&Value::Null).is_ok());
        assert!(SettingKind::StringList.check(&Value::Null).is_ok());
    }

    #[test]
    fn integer_accepted_where_number_expected() {
        assert!(SettingKind::Number.check(&yaml("80")).is_ok());
        assert!(SettingKind::Integer.check(&yaml("0.5")).is_err());
    }

    #[test]
    fn type_names() {
        assert_eq!(type_name(&yaml("~")), "null");
        assert_eq!(type_name(&yaml("1")), "integer");
        assert_eq!(type_name(&yaml("1.5")), "number");
        assert_eq!(type_name(&yaml("{a: 1}")), "mapping");
    }

    #[test]
    fn global_defaults_cover_thresholds() {
        let defaults = global_defaults();
        assert_eq!(defaults[EXCLUDE_LIMIT], 15);
        assert_eq!(defaults[COLLAPSE_THRESHOLD], 0.8);
        assert_eq!(defaults[INCLUDE][0], "**/*.rb");
        assert!(defaults.get(MIN_COVERAGE).is_none());
        assert!(defaults.get(ENABLED).is_none());
    }
}
