//! Configuration validation.
//!
//! Validation collects every problem in a merged document rather than
//! stopping at the first one, so users can fix them all in one pass:
//!
//! - Top-level keys must be `AllValidators` or a registered validator id
//! - Block keys must be declared by the block's schema
//! - Values must have the declared type
//! - Severity and choice tokens must be known
//! - Numeric thresholds must be in range and globs must compile

use serde_yaml::{Mapping, Value};

use crate::config::schema::{
    global_kinds, type_name, SettingKind, COLLAPSE_THRESHOLD, EXCLUDE, EXCLUDE_LIMIT, GLOBAL_KEY,
    INCLUDE, MIN_COVERAGE, OPTIONS, SEVERITY,
};
use crate::config::suggest::did_you_mean;
use crate::error::ConfigIssue;
use crate::pattern::PathPattern;
use crate::validators::ValidatorRegistry;

/// Validate a merged configuration document against the registry.
pub fn validate_config(document: &Mapping, registry: &ValidatorRegistry) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    for (key, value) in document {
        let Some(key) = key.as_str() else {
            issues.push(ConfigIssue::new(
                format!("{:?}", key),
                format!("top-level keys must be strings, got {}", type_name(key)),
            ));
            continue;
        };

        if key == GLOBAL_KEY {
            let kinds = global_kinds();
            let lookup = |k: &str| kinds.iter().find(|(name, _)| *name == k).map(|(_, kind)| *kind);
            let known: Vec<&str> = kinds.iter().map(|(name, _)| *name).collect();
            validate_block(key, value, &lookup, &known, &mut issues);
        } else if let Some(spec) = registry.get(key) {
            let known: Vec<&str> = spec.keys().collect();
            validate_block(key, value, &|k: &str| spec.kind_of(k), &known, &mut issues);
            if !spec.children().is_empty() {
                composite_problems(key, value, &mut issues);
            }
        } else {
            let message = if key.contains('/') {
                "unknown validator"
            } else {
                "unknown top-level key"
            };
            let candidates = registry
                .ids()
                .map(|id| id.as_str())
                .chain(std::iter::once(GLOBAL_KEY));
            issues.push(
                ConfigIssue::new(key, message).with_suggestion(did_you_mean(key, candidates)),
            );
        }
    }

    issues
}

/// Validate the validator ids given to `--only`.
pub fn validate_only(only: &[String], registry: &ValidatorRegistry) -> Vec<ConfigIssue> {
    only.iter()
        .filter(|id| registry.get(id).is_none())
        .map(|id| {
            ConfigIssue::new("--only", format!("unknown validator '{}'", id))
                .with_suggestion(did_you_mean(id, registry.ids().map(|i| i.as_str())))
        })
        .collect()
}

fn validate_block(
    block: &str,
    value: &Value,
    kind_of: &dyn Fn(&str) -> Option<SettingKind>,
    known: &[&str],
    issues: &mut Vec<ConfigIssue>,
) {
    let mapping = match value {
        Value::Null => return,
        Value::Mapping(m) => m,
        other => {
            issues.push(ConfigIssue::new(
                block,
                format!("expected a mapping, got {}", type_name(other)),
            ));
            return;
        }
    };

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            issues.push(ConfigIssue::new(
                block,
                format!("keys must be strings, got {}", type_name(key)),
            ));
            continue;
        };
        let location = format!("{}.{}", block, key);

        let Some(kind) = kind_of(key) else {
            issues.push(
                ConfigIssue::new(location, "unknown key")
                    .with_suggestion(did_you_mean(key, known.iter().copied())),
            );
            continue;
        };

        if let Err(message) = kind.check(value) {
            issues.push(ConfigIssue::new(location, message));
            continue;
        }

        if let (Some(tokens), Value::String(token)) = (kind.tokens(), value) {
            if !tokens.contains(&token.as_str()) {
                issues.push(
                    ConfigIssue::new(
                        location,
                        format!("invalid value '{}', expected {}", token, kind.describe()),
                    )
                    .with_suggestion(did_you_mean(token, tokens.iter().copied())),
                );
                continue;
            }
        }

        if let Some(message) = range_problem(key, value) {
            issues.push(ConfigIssue::new(location, message));
            continue;
        }

        if key == EXCLUDE || key == INCLUDE {
            for glob in value.as_sequence().into_iter().flatten() {
                if let Some(glob) = glob.as_str() {
                    if let Err(e) = PathPattern::new(glob) {
                        issues.push(ConfigIssue::new(
                            location.clone(),
                            format!("invalid glob '{}': {}", glob, e),
                        ));
                    }
                }
            }
        }
    }
}

/// Keys a composite's children resolve on their own.
fn composite_problems(block: &str, value: &Value, issues: &mut Vec<ConfigIssue>) {
    let Value::Mapping(mapping) = value else {
        return;
    };
    for key in [SEVERITY, OPTIONS] {
        if mapping.get(key).is_some_and(|v| !v.is_null()) {
            issues.push(ConfigIssue::new(
                format!("{}.{}", block, key),
                "has no effect on a composite validator; set it on its children",
            ));
        }
    }
}

pub(crate) fn range_problem(key: &str, value: &Value) -> Option<String> {
    let number = value.as_f64()?;
    match key {
        MIN_COVERAGE if !(0.0..=100.0).contains(&number) => {
            Some(format!("must be between 0 and 100, got {}", number))
        }
        EXCLUDE_LIMIT if number < 1.0 => Some(format!("must be at least 1, got {}", number)),
        COLLAPSE_THRESHOLD if !(number > 0.0 && number <= 1.0) => Some(format!(
            "must be greater than 0 and at most 1, got {}",
            number
        )),
        _ => None,
    }
}
