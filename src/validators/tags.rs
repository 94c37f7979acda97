//! `Tags/*` validators: tag order, type lists and tag usage.

use std::collections::HashSet;

use super::rule::{query_line, QueryContext, Severity, ValidatorSpec};
use super::types::{parse_types, TypeExpr};
use crate::docs::{DocIndex, DocObject, DocTag, ObjectKind};

const TYPED_TAGS: &[&str] = &["param", "option", "return", "yieldparam", "yieldreturn", "raise"];

/// Types that are always known, besides the project's own classes and modules.
const CORE_TYPES: &[&str] = &[
    "ArgumentError", "Array", "BasicObject", "BigDecimal", "Boolean", "Class", "Comparable",
    "Complex", "Date", "DateTime", "Dir", "Encoding", "Enumerable", "Enumerator", "Exception",
    "FalseClass", "File", "Float", "Hash", "IO", "IOError", "IndexError", "Integer", "JSON",
    "Kernel", "KeyError", "Logger", "MatchData", "Method", "Module", "Mutex", "NameError",
    "NilClass", "NoMethodError", "NotImplementedError", "Numeric", "Object", "Pathname", "Proc",
    "Queue", "Range", "Rational", "Regexp", "RuntimeError", "Set", "StandardError", "String",
    "StringIO", "Struct", "Symbol", "Thread", "Time", "TrueClass", "TypeError", "URI", "false",
    "nil", "self", "true", "undefined", "void",
];

pub fn validators() -> Vec<ValidatorSpec> {
    vec![
        ValidatorSpec::query("Tags/Order", "Tags appear in the enforced order", tag_order)
            .severity(Severity::Convention)
            .list_setting(
                "EnforcedOrder",
                &[
                    "param",
                    "option",
                    "yield",
                    "yieldparam",
                    "yieldreturn",
                    "return",
                    "raise",
                    "see",
                    "example",
                    "note",
                    "todo",
                ],
            ),
        ValidatorSpec::query(
            "Tags/TypeSyntax",
            "Tag type lists are syntactically valid",
            type_syntax,
        )
        .severity(Severity::Error)
        .list_setting("ValidatedTags", TYPED_TAGS),
        ValidatorSpec::query(
            "Tags/InvalidTypes",
            "Tag type lists only name known types",
            invalid_types,
        )
        .severity(Severity::Warning)
        .list_setting("ValidatedTags", TYPED_TAGS)
        .list_setting("ExtraTypes", &[]),
        ValidatorSpec::query(
            "Tags/MeaninglessTag",
            "Parameter tags on objects that cannot have parameters",
            meaningless_tag,
        )
        .severity(Severity::Warning)
        .list_setting("CheckedTags", &["param", "option"])
        .list_setting("InvalidObjectTypes", &["class", "module", "constant"]),
        ValidatorSpec::query(
            "Tags/CollectionType",
            "Hash types use the enforced notation",
            collection_type,
        )
        .severity(Severity::Convention)
        .choice_setting("EnforcedStyle", "long", &["long", "short"]),
        ValidatorSpec::query(
            "Tags/OptionTags",
            "Options-hash parameters are described with @option tags",
            option_tags,
        )
        .severity(Severity::Warning)
        .list_setting("ParameterNames", &["options", "opts", "kwargs"]),
        ValidatorSpec::query("Tags/ApiTags", "Objects declare an allowed @api", api_tags)
            .enabled(false)
            .severity(Severity::Warning)
            .list_setting("AllowedApis", &["public", "private", "internal"]),
    ]
}

fn typed_tags<'a>(
    object: &'a DocObject,
    validated: &'a [String],
) -> impl Iterator<Item = (&'a DocTag, &'a [String])> + 'a {
    object
        .tags
        .iter()
        .filter(move |t| validated.iter().any(|v| *v == t.name))
        .filter_map(|t| t.types.as_deref().map(|types| (t, types)))
}

fn tag_order(ctx: &QueryContext<'_>) -> Vec<String> {
    let order = ctx.settings.list("EnforcedOrder");
    let rank = |name: &str| order.iter().position(|o| o == name);

    ctx.objects()
        .filter_map(|object| {
            let ranked: Vec<(&str, usize)> = object
                .tags
                .iter()
                .filter_map(|t| rank(t.name.as_str()).map(|r| (t.name.as_str(), r)))
                .collect();

            ranked
                .windows(2)
                .find(|pair| pair[1].1 < pair[0].1)
                .map(|pair| {
                    query_line(
                        object,
                        format_args!("@{} should appear before @{}", pair[1].0, pair[0].0),
                    )
                })
        })
        .collect()
}

fn type_syntax(ctx: &QueryContext<'_>) -> Vec<String> {
    let validated = ctx.settings.list("ValidatedTags");
    let mut lines = Vec::new();

    for object in ctx.objects() {
        for (tag, types) in typed_tags(object, &validated) {
            for ty in types {
                if let Err(e) = parse_types(ty) {
                    lines.push(query_line(
                        object,
                        format_args!("Invalid type syntax `{}` in @{} tag: {}", ty, tag.name, e),
                    ));
                }
            }
        }
    }

    lines
}

fn known_types(index: &DocIndex, extra: &[String]) -> HashSet<String> {
    let mut known: HashSet<String> = CORE_TYPES.iter().map(|t| (*t).to_string()).collect();
    known.extend(extra.iter().cloned());

    for object in index.objects() {
        if matches!(object.kind, ObjectKind::Class | ObjectKind::Module) {
            known.insert(object.path.clone());
            let mut rest = object.path.as_str();
            while let Some((_, tail)) = rest.split_once("::") {
                known.insert(tail.to_string());
                rest = tail;
            }
        }
    }

    known
}

fn invalid_types(ctx: &QueryContext<'_>) -> Vec<String> {
    let validated = ctx.settings.list("ValidatedTags");
    let known = known_types(ctx.index, &ctx.settings.list("ExtraTypes"));
    let mut lines = Vec::new();

    for object in ctx.objects() {
        for (tag, types) in typed_tags(object, &validated) {
            let mut reported = HashSet::new();
            for expr in types.iter().filter_map(|t| parse_types(t).ok()).flatten() {
                for name in expr.names() {
                    let name = name.trim_start_matches("::");
                    if !known.contains(name) && reported.insert(name.to_string()) {
                        lines.push(query_line(
                            object,
                            format_args!("Unknown type `{}` in @{} tag", name, tag.name),
                        ));
                    }
                }
            }
        }
    }

    lines
}

fn meaningless_tag(ctx: &QueryContext<'_>) -> Vec<String> {
    let checked = ctx.settings.list("CheckedTags");
    let invalid_kinds = ctx.settings.list("InvalidObjectTypes");
    let mut lines = Vec::new();

    for object in ctx
        .objects()
        .filter(|o| invalid_kinds.iter().any(|k| k == o.kind.as_str()))
    {
        for tag in object.tags.iter().filter(|t| checked.contains(&t.name)) {
            lines.push(query_line(
                object,
                format_args!("@{} tag is meaningless on a {}", tag.name, object.kind),
            ));
        }
    }

    lines
}

fn restyled(expr: &TypeExpr, long: bool) -> Option<TypeExpr> {
    match expr {
        TypeExpr::Generic { name, args } if long && name == "Hash" && args.len() == 2 => {
            Some(TypeExpr::Hash {
                name: name.clone(),
                keys: vec![args[0].clone()],
                values: vec![args[1].clone()],
            })
        }
        TypeExpr::Hash { name, keys, values }
            if !long && keys.len() == 1 && values.len() == 1 =>
        {
            Some(TypeExpr::Generic {
                name: name.clone(),
                args: vec![keys[0].clone(), values[0].clone()],
            })
        }
        _ => None,
    }
}

fn collection_type(ctx: &QueryContext<'_>) -> Vec<String> {
    let long = ctx.settings.string("EnforcedStyle").as_deref() != Some("short");
    let mut lines = Vec::new();

    for object in ctx.objects() {
        for tag in &object.tags {
            let Some(types) = &tag.types else { continue };
            for expr in types.iter().filter_map(|t| parse_types(t).ok()).flatten() {
                let mut found = Vec::new();
                expr.walk(&mut |e| {
                    if let Some(fixed) = restyled(e, long) {
                        found.push((e.to_string(), fixed.to_string()));
                    }
                });
                for (actual, expected) in found {
                    lines.push(query_line(
                        object,
                        format_args!("Use `{}` instead of `{}` in @{} tag", expected, actual, tag.name),
                    ));
                }
            }
        }
    }

    lines
}

fn option_tags(ctx: &QueryContext<'_>) -> Vec<String> {
    let names = ctx.settings.list("ParameterNames");

    ctx.objects()
        .filter(|o| o.kind == ObjectKind::Method && !o.has_tag("option"))
        .filter_map(|object| {
            object
                .parameters
                .iter()
                .find(|p| names.iter().any(|n| n == p.bare_name()))
                .map(|param| {
                    query_line(
                        object,
                        format_args!(
                            "Method `{}` takes `{}` but has no @option tags",
                            object.path,
                            param.bare_name()
                        ),
                    )
                })
        })
        .collect()
}

fn api_tags(ctx: &QueryContext<'_>) -> Vec<String> {
    let allowed = ctx.settings.list("AllowedApis");

    ctx.objects()
        .filter_map(|object| {
            let Some(tag) = object.tags_named("api").next() else {
                return Some(query_line(object, "Missing @api tag"));
            };
            let value = tag.text.split_whitespace().next().unwrap_or("");
            if allowed.iter().any(|a| a == value) {
                None
            } else {
                Some(query_line(
                    object,
                    format_args!(
                        "Invalid @api value `{}`, expected one of: {}",
                        value,
                        allowed.join(", ")
                    ),
                ))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::rule::tests_support::run_query;

    fn method(path: &str) -> DocObject {
        DocObject::new(ObjectKind::Method, path, "lib/cart.rb", 10).with_docstring("Does things.")
    }

    fn typed(name: &str, key: Option<&str>, ty: &str) -> DocTag {
        let tag = DocTag::new(name).with_types([ty]);
        match key {
            Some(k) => tag.with_key(k),
            None => tag,
        }
    }

    #[test]
    fn order_reports_first_out_of_order_pair() {
        let objects = vec![
            method("Cart#add")
                .with_tag(DocTag::new("return"))
                .with_tag(DocTag::new("param").with_key("item")),
            method("Cart#remove")
                .with_tag(DocTag::new("param"))
                .with_tag(DocTag::new("custom"))
                .with_tag(DocTag::new("return")),
        ];

        let lines = run_query("Tags/Order", objects, "");

        assert_eq!(
            lines,
            vec!["lib/cart.rb\t10\tCart#add\t@param should appear before @return"]
        );
    }

    #[test]
    fn order_follows_configured_order() {
        let objects = vec![method("Cart#add")
            .with_tag(DocTag::new("return"))
            .with_tag(DocTag::new("param"))];

        let lines = run_query("Tags/Order", objects, "EnforcedOrder: [return, param]");
        assert!(lines.is_empty());
    }

    #[test]
    fn type_syntax_reports_unparseable_types() {
        let objects = vec![method("Cart#add")
            .with_tag(typed("param", Some("item"), "Array<Item"))
            .with_tag(typed("return", None, "Boolean"))];

        let lines = run_query("Tags/TypeSyntax", objects, "");

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Invalid type syntax `Array<Item` in @param tag"));
    }

    #[test]
    fn type_syntax_only_checks_validated_tags() {
        let objects = vec![method("Cart#add").with_tag(typed("see", None, "<<<"))];
        assert!(run_query("Tags/TypeSyntax", objects, "").is_empty());
    }

    #[test]
    fn invalid_types_knows_core_project_and_extra_types() {
        let objects = vec![
            DocObject::new(ObjectKind::Class, "Shop::Item", "lib/item.rb", 1).with_docstring("x"),
            method("Cart#add")
                .with_tag(typed("param", Some("item"), "Item"))
                .with_tag(typed("param", Some("qty"), "Array<Integr>"))
                .with_tag(typed("return", None, "Money, nil")),
        ];

        let lines = run_query("Tags/InvalidTypes", objects.clone(), "");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Unknown type `Integr` in @param tag"));
        assert!(lines[1].contains("Unknown type `Money` in @return tag"));

        let lines = run_query("Tags/InvalidTypes", objects, "ExtraTypes: [Money, Integr]");
        assert!(lines.is_empty());
    }

    #[test]
    fn meaningless_tag_on_class() {
        let objects = vec![
            DocObject::new(ObjectKind::Class, "Cart", "lib/cart.rb", 1)
                .with_tag(DocTag::new("param").with_key("x")),
            method("Cart#add").with_tag(DocTag::new("param").with_key("x")),
        ];

        let lines = run_query("Tags/MeaninglessTag", objects, "");

        assert_eq!(lines, vec!["lib/cart.rb\t1\tCart\t@param tag is meaningless on a class"]);
    }

    #[test]
    fn collection_type_long_style() {
        let objects = vec![method("Cart#add").with_tag(typed(
            "return",
            None,
            "Array<Hash<Symbol, String>>",
        ))];

        let lines = run_query("Tags/CollectionType", objects, "");

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Use `Hash{Symbol => String}` instead of `Hash<Symbol, String>`"));
    }

    #[test]
    fn collection_type_short_style() {
        let objects = vec![
            method("Cart#add").with_tag(typed("return", None, "Hash{Symbol => String}")),
        ];

        let lines = run_query("Tags/CollectionType", objects, "EnforcedStyle: short");

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Use `Hash<Symbol, String>`"));
    }

    #[test]
    fn option_tags_required_for_options_parameter() {
        let objects = vec![
            method("Cart#add").with_parameter("item").with_parameter("opts"),
            method("Cart#remove")
                .with_parameter("**options")
                .with_tag(DocTag::new("option").with_key("options")),
        ];

        let lines = run_query("Tags/OptionTags", objects, "");

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Method `Cart#add` takes `opts`"));
    }

    #[test]
    fn api_tags_missing_and_invalid() {
        let mut allowed = DocTag::new("api");
        allowed.text = "public".to_string();
        let mut invalid = DocTag::new("api");
        invalid.text = "experimental".to_string();

        let objects = vec![
            method("Cart#add").with_tag(allowed),
            method("Cart#remove").with_tag(invalid),
            method("Cart#clear"),
        ];

        let lines = run_query("Tags/ApiTags", objects, "");

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Invalid @api value `experimental`"));
        assert!(lines[1].contains("Missing @api tag"));
    }
}
