//! Integration tests for a full check run through the public API.

use std::path::{Path, PathBuf};

use tagcheck::config::{ConfigStore, RawConfig};
use tagcheck::docs::{DocIndex, DocObject, DocTag, ExtractionWarning, ObjectKind, StaticSource};
use tagcheck::runner::check;
use tagcheck::validators::{builtin, Severity};

fn index() -> DocIndex {
    DocIndex::new(
        vec![
            DocObject::new(ObjectKind::Class, "Cart", "lib/cart.rb", 1).with_docstring("A cart."),
            DocObject::new(ObjectKind::Method, "Cart#add", "lib/cart.rb", 4)
                .with_docstring("Adds an item.")
                .with_parameter("item")
                .with_tag(DocTag::new("return").with_types(["Cart"])),
            DocObject::new(ObjectKind::Class, "Legacy", "lib/legacy/old.rb", 1),
        ],
        vec![ExtractionWarning {
            message: "Unknown tag @fixme".to_string(),
            file: PathBuf::from("lib/cart.rb"),
            line: 3,
        }],
    )
}

fn files() -> Vec<PathBuf> {
    vec![PathBuf::from("lib/cart.rb"), PathBuf::from("lib/legacy/old.rb")]
}

fn store(yaml: &str) -> ConfigStore {
    ConfigStore::new(&RawConfig::from_yaml(yaml).unwrap(), builtin(), &[]).unwrap()
}

#[test]
fn reports_offenses_from_queries_and_composites() {
    let store = store("");
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));

    let ids: Vec<&str> = result.offenses().iter().map(|o| o.validator().as_str()).collect();
    assert!(ids.contains(&"Documentation/UndocumentedObjects"));
    assert!(ids.contains(&"Documentation/UndocumentedMethodArguments"));
    assert!(ids.contains(&"Warnings/UnknownTag"));
    assert!(!ids.contains(&"Warnings/Parser"));

    assert_eq!(result.files_inspected(), 2);
    assert_eq!(result.coverage().total, 3);
    assert_eq!(result.coverage().documented, 2);
    assert!(!result.passed());
}

#[test]
fn global_exclusion_removes_files_from_scope() {
    let store = store("AllValidators:\n  Exclude: ['lib/legacy/**/*']\n");
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));

    assert_eq!(result.files_inspected(), 1);
    assert!(result
        .offenses()
        .iter()
        .all(|o| o.file() != Path::new("lib/legacy/old.rb")));
    assert_eq!(result.coverage().total, 2);
}

#[test]
fn child_settings_shape_composite_offenses() {
    let store = store(
        "Warnings/UnknownTag:\n  Severity: error\n  Exclude: ['lib/cart.rb']\nWarnings/Parser:\n  Enabled: true\n",
    );
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));

    assert!(!result
        .offenses()
        .iter()
        .any(|o| o.validator().as_str() == "Warnings/UnknownTag"));

    let store = self::store("Warnings/UnknownTag:\n  Severity: error\n");
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));
    let unknown = result
        .offenses()
        .iter()
        .find(|o| o.validator().as_str() == "Warnings/UnknownTag")
        .unwrap();
    assert_eq!(unknown.severity(), Severity::Error);
    assert_eq!(unknown.line(), 3);
}

#[test]
fn disabled_parent_silences_children() {
    let store = store("Warnings/Parser:\n  Enabled: false\n");
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));

    assert!(!result
        .offenses()
        .iter()
        .any(|o| o.validator().category() == "Warnings"));
}

#[test]
fn only_restricts_the_run() {
    let raw = RawConfig::from_yaml("").unwrap();
    let store = ConfigStore::new(&raw, builtin(), &["Tags/Order".to_string()]).unwrap();
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));

    assert!(result.offenses().is_empty());
    assert!(result.failures().is_empty());
    assert!(result.passed());
}

#[test]
fn coverage_gate_can_fail_an_otherwise_clean_run() {
    let store = store("AllValidators:\n  FailOnSeverity: never\n  MinCoverage: 90\n");
    let result = check(&store, Path::new("."), files(), &StaticSource::new(index()));

    assert!(!result.has_failing_offense());
    assert!(result.below_min_coverage());
    assert!(!result.passed());
}

#[test]
fn validator_options_decide_visibility_on_their_own() {
    let index = DocIndex::new(
        vec![
            DocObject::new(ObjectKind::Method, "Cart#total", "lib/cart.rb", 2),
            DocObject::new(ObjectKind::Method, "Cart#recalculate", "lib/cart.rb", 9)
                .with_visibility(tagcheck::docs::Visibility::Private),
        ],
        Vec::new(),
    );
    let files = vec![PathBuf::from("lib/cart.rb")];
    let undocumented = |yaml: &str| -> Vec<String> {
        let store = store(yaml);
        let result = check(&store, Path::new("."), files.clone(), &StaticSource::new(index.clone()));
        result
            .offenses()
            .iter()
            .filter(|o| o.validator().as_str() == "Documentation/UndocumentedObjects")
            .map(|o| o.message().to_string())
            .collect()
    };

    let own_empty = undocumented(
        "AllValidators:\n  Options: ['--private']\nDocumentation/UndocumentedObjects:\n  Options: []\n",
    );
    assert_eq!(own_empty, vec!["Undocumented method: Cart#total"]);

    let inherited = undocumented("AllValidators:\n  Options: ['--private']\n");
    assert_eq!(inherited.len(), 2);

    let own_private = undocumented("Documentation/UndocumentedObjects:\n  Options: ['--private']\n");
    assert_eq!(own_private.len(), 2);
}

#[test]
fn exclusion_applies_only_to_the_validator_that_declares_it() {
    let index = DocIndex::new(
        vec![
            DocObject::new(ObjectKind::Class, "Item", "lib/item.rb", 1),
            DocObject::new(ObjectKind::Method, "Item#valid?", "lib/item.rb", 3),
        ],
        Vec::new(),
    );
    let store = store("Documentation/UndocumentedObjects:\n  Exclude: ['lib/item.rb']\n");
    let result = check(
        &store,
        Path::new("."),
        vec![PathBuf::from("lib/item.rb")],
        &StaticSource::new(index),
    );

    let in_item = |id: &str| {
        result
            .offenses()
            .iter()
            .filter(|o| o.validator().as_str() == id)
            .filter(|o| o.file().ends_with("lib/item.rb"))
            .count()
    };
    assert_eq!(in_item("Documentation/UndocumentedObjects"), 0);
    assert_eq!(in_item("Documentation/UndocumentedBooleanMethods"), 1);
    assert_eq!(result.files_inspected(), 1);
}
