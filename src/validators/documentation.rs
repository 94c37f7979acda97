//! `Documentation/*` validators: objects and arguments without docs.

use super::rule::{query_line, QueryContext, Severity, ValidatorSpec};
use crate::docs::ObjectKind;

pub fn validators() -> Vec<ValidatorSpec> {
    vec![
        ValidatorSpec::query(
            "Documentation/UndocumentedObjects",
            "Classes, modules, methods and constants without documentation",
            undocumented_objects,
        )
        .severity(Severity::Warning)
        .list_setting("ExcludedMethods", &["initialize"]),
        ValidatorSpec::query(
            "Documentation/UndocumentedMethodArguments",
            "Documented methods with parameters that have no @param tag",
            undocumented_method_arguments,
        )
        .severity(Severity::Warning),
        ValidatorSpec::query(
            "Documentation/UndocumentedBooleanMethods",
            "Predicate methods without a @return tag",
            undocumented_boolean_methods,
        )
        .severity(Severity::Warning),
    ]
}

fn undocumented_objects(ctx: &QueryContext<'_>) -> Vec<String> {
    let excluded = ctx.settings.list("ExcludedMethods");

    ctx.objects()
        .filter(|o| !o.is_documented())
        .filter(|o| !(o.kind == ObjectKind::Method && excluded.iter().any(|m| m == o.name())))
        .map(|o| query_line(o, format_args!("Undocumented {}: {}", o.kind, o.path)))
        .collect()
}

fn undocumented_method_arguments(ctx: &QueryContext<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    for object in ctx
        .objects()
        .filter(|o| o.kind == ObjectKind::Method && o.is_documented())
    {
        for param in object.parameters.iter().filter(|p| !p.is_block()) {
            let name = param.bare_name();
            let documented = object
                .tags_named("param")
                .any(|t| t.key.as_deref() == Some(name));
            if !documented {
                lines.push(query_line(
                    object,
                    format_args!("Missing @param tag for `{}`", name),
                ));
            }
        }
    }

    lines
}

fn undocumented_boolean_methods(ctx: &QueryContext<'_>) -> Vec<String> {
    ctx.objects()
        .filter(|o| o.kind == ObjectKind::Method && o.name().ends_with('?'))
        .filter(|o| !o.has_tag("return"))
        .map(|o| {
            query_line(
                o,
                format_args!("Predicate method `{}` has no @return tag", o.path),
            )
        })
        .collect()
}
