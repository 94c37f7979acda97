//! Deep merge algorithm for YAML configuration values.
//!
//! A configuration document is merged on top of everything it inherits.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely (never concatenated)
//! - Null values in the overlay delete the corresponding key from the base
//! - Scalars in the overlay replace whatever the base holds

use serde_yaml::{Mapping, Value};

/// Deep merge two YAML values.
///
/// Later values override earlier values at the point of conflict.
///
/// # Arguments
///
/// * `base` - The inherited configuration
/// * `overlay` - The inheriting configuration (takes precedence)
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            Value::Mapping(merge_mappings(base_map, overlay_map))
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Deep merge two mappings. See [`deep_merge`] for the rules.
pub fn merge_mappings(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut result = base.clone();

    for (key, overlay_value) in overlay {
        if overlay_value.is_null() {
            result.remove(key);
        } else if let Some(base_value) = base.get(key) {
            result.insert(key.clone(), deep_merge(base_value, overlay_value));
        } else {
            result.insert(key.clone(), overlay_value.clone());
        }
    }

    result
}

/// Merge multiple documents in order (later overrides earlier).
pub fn merge_configs(configs: &[Mapping]) -> Mapping {
    configs
        .iter()
        .fold(Mapping::new(), |acc, config| merge_mappings(&acc, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn mapping(s: &str) -> Mapping {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn deep_merge_replaces_at_conflict_point() {
        let base = yaml(
            r#"
Tags/Order:
  Severity: warning
  EnforcedOrder:
    - param
    - return
"#,
        );
        let overlay = yaml(
            r#"
Tags/Order:
  Severity: error
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert_eq!(result["Tags/Order"]["Severity"], "error");
        assert_eq!(result["Tags/Order"]["EnforcedOrder"][0], "param");
    }

    #[test]
    fn sequences_are_replaced_not_concatenated() {
        let base = yaml(
            r#"
AllValidators:
  Exclude:
    - vendor/**/*
    - tmp/**/*
"#,
        );
        let overlay = yaml(
            r#"
AllValidators:
  Exclude:
    - spec/**/*
"#,
        );

        let result = deep_merge(&base, &overlay);
        let exclude = result["AllValidators"]["Exclude"].as_sequence().unwrap();

        assert_eq!(exclude.len(), 1);
        assert_eq!(exclude[0], "spec/**/*");
    }

    #[test]
    fn empty_sequence_in_overlay_wins() {
        let base = yaml("AllValidators:\n  Options: ['--private']");
        let overlay = yaml("AllValidators:\n  Options: []");

        let result = deep_merge(&base, &overlay);

        assert!(result["AllValidators"]["Options"]
            .as_sequence()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn null_removes_inherited_value() {
        let base = yaml(
            r#"
Tags/Order:
  Enabled: false
  Severity: warning
"#,
        );
        let overlay = yaml(
            r#"
Tags/Order:
  Enabled: ~
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert!(result["Tags/Order"].get("Enabled").is_none());
        assert_eq!(result["Tags/Order"]["Severity"], "warning");
    }

    #[test]
    fn scalar_overlay_replaces_mapping_base() {
        let base = yaml("AllValidators:\n  Severity: warning");
        let overlay = yaml("AllValidators: disabled");

        let result = deep_merge(&base, &overlay);
        assert_eq!(result["AllValidators"], "disabled");
    }

    #[test]
    fn empty_overlay_returns_base_unchanged() {
        let base = yaml("Tags/Order:\n  Enabled: true");
        let result = deep_merge(&base, &yaml("{}"));
        assert_eq!(result["Tags/Order"]["Enabled"], true);
    }

    #[test]
    fn merge_configs_merges_multiple_in_order() {
        let configs = vec![mapping("a: 1\nb: 2"), mapping("b: 3\nc: 4"), mapping("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn merge_empty_configs_returns_empty() {
        assert!(merge_configs(&[]).is_empty());
    }
}
