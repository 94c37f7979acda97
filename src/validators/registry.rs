//! Validator registry.
//!
//! The registry is built once from an append-only [`RegistryBuilder`] and is
//! immutable afterwards. Registration order is run order.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::rule::{ValidatorId, ValidatorSpec};
use super::{documentation, style, tags, warnings};

/// Collects validator specs before freezing them into a registry.
#[derive(Default)]
pub struct RegistryBuilder {
    specs: Vec<ValidatorSpec>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator. An id that is already registered keeps its first
    /// spec; the duplicate is dropped.
    pub fn register(mut self, spec: ValidatorSpec) -> Self {
        if self.specs.iter().any(|s| s.id() == spec.id()) {
            tracing::warn!("Validator {} is already registered; ignoring duplicate", spec.id());
        } else {
            self.specs.push(spec);
        }
        self
    }

    /// Append several validators in order.
    pub fn register_all(self, specs: impl IntoIterator<Item = ValidatorSpec>) -> Self {
        specs.into_iter().fold(self, Self::register)
    }

    /// Freeze the registry.
    pub fn build(self) -> ValidatorRegistry {
        let by_id = self
            .specs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id().as_str().to_string(), i))
            .collect();

        let mut parents = HashMap::new();
        for spec in &self.specs {
            for child in spec.children() {
                parents.insert(child.as_str().to_string(), spec.id().clone());
            }
        }

        ValidatorRegistry {
            specs: self.specs,
            by_id,
            parents,
        }
    }
}

/// Immutable catalog of validators.
#[derive(Debug)]
pub struct ValidatorRegistry {
    specs: Vec<ValidatorSpec>,
    by_id: HashMap<String, usize>,
    parents: HashMap<String, ValidatorId>,
}

impl ValidatorRegistry {
    /// Look up a validator by id.
    pub fn get(&self, id: &str) -> Option<&ValidatorSpec> {
        self.by_id.get(id).map(|&i| &self.specs[i])
    }

    /// Whether the id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All validators in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidatorSpec> {
        self.specs.iter()
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &ValidatorId> {
        self.specs.iter().map(ValidatorSpec::id)
    }

    /// The composite parent of a child validator.
    pub fn parent_of(&self, id: &str) -> Option<&ValidatorId> {
        self.parents.get(id)
    }

    /// Whether the validator only runs as part of a composite parent.
    pub fn is_child(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    /// Children of a composite validator, in invocation order.
    pub fn children(&self, id: &str) -> &[ValidatorId] {
        match self.get(id) {
            Some(spec) => spec.children(),
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

static BUILTIN: LazyLock<Arc<ValidatorRegistry>> = LazyLock::new(|| {
    Arc::new(
        RegistryBuilder::new()
            .register_all(documentation::validators())
            .register_all(tags::validators())
            .register_all(warnings::validators())
            .register_all(style::validators())
            .build(),
    )
});

/// The built-in validators.
pub fn builtin() -> Arc<ValidatorRegistry> {
    Arc::clone(&BUILTIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{Execution, Severity};

    #[test]
    fn builtin_contains_every_category() {
        let registry = builtin();
        for id in [
            "Documentation/UndocumentedObjects",
            "Documentation/UndocumentedMethodArguments",
            "Documentation/UndocumentedBooleanMethods",
            "Tags/Order",
            "Tags/TypeSyntax",
            "Tags/InvalidTypes",
            "Tags/MeaninglessTag",
            "Tags/CollectionType",
            "Tags/OptionTags",
            "Tags/ApiTags",
            "Warnings/Parser",
            "Warnings/UnknownTag",
            "Style/ExternalTool",
        ] {
            assert!(registry.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn builtin_ids_are_category_slash_name() {
        for id in builtin().ids() {
            assert!(!id.category().is_empty() && !id.name().is_empty(), "{}", id);
        }
    }

    #[test]
    fn composite_membership_has_reverse_lookup() {
        let registry = builtin();
        let children = registry.children("Warnings/Parser");
        assert_eq!(children.len(), 6);

        for child in children {
            assert_eq!(
                registry.parent_of(child.as_str()).map(|p| p.as_str()),
                Some("Warnings/Parser")
            );
            assert!(registry.is_child(child.as_str()));
        }
        assert!(!registry.is_child("Warnings/Parser"));
    }

    #[test]
    fn static_defaults_match_catalog() {
        let registry = builtin();
        let order = registry.get("Tags/Order").unwrap();
        assert_eq!(order.default_severity(), Severity::Convention);
        assert!(order.default_enabled());

        let api = registry.get("Tags/ApiTags").unwrap();
        assert!(!api.default_enabled());

        let syntax = registry.get("Tags/TypeSyntax").unwrap();
        assert_eq!(syntax.default_severity(), Severity::Error);

        let tool = registry.get("Style/ExternalTool").unwrap();
        assert!(matches!(tool.execution(), Execution::Process));
    }

    #[test]
    fn duplicate_registration_keeps_the_first_spec() {
        let registry = RegistryBuilder::new()
            .register(ValidatorSpec::new("A/One", "first", Execution::Process))
            .register(ValidatorSpec::new("A/Two", "second", Execution::Process))
            .register(ValidatorSpec::new("A/One", "duplicate", Execution::Process))
            .build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("A/One").unwrap().description(), "first");
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["A/One", "A/Two"]);
    }
}
