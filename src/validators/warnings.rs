//! `Warnings/*` validators: problems the extraction engine reported.
//!
//! `Warnings/Parser` is a composite; each child picks out one kind of
//! extraction warning by its message marker.

use super::rule::{QueryContext, Severity, ValidatorSpec};
use crate::docs::ExtractionWarning;
use crate::pattern::to_slash;

/// Composite parent id.
pub const PARSER: &str = "Warnings/Parser";

/// Children in invocation order, with their default severities.
const CHILDREN: &[(&str, Severity)] = &[
    ("Warnings/UnknownTag", Severity::Error),
    ("Warnings/UnknownDirective", Severity::Error),
    ("Warnings/InvalidTagFormat", Severity::Error),
    ("Warnings/InvalidDirectiveFormat", Severity::Error),
    ("Warnings/DuplicatedParameterName", Severity::Warning),
    ("Warnings/UnknownParameterName", Severity::Warning),
];

pub fn validators() -> Vec<ValidatorSpec> {
    let child_ids: Vec<&str> = CHILDREN.iter().map(|(id, _)| *id).collect();

    let mut specs = vec![ValidatorSpec::composite(
        PARSER,
        "Warnings raised while reading docstrings",
        &child_ids,
    )
    .severity(Severity::Warning)];

    specs.extend([
        ValidatorSpec::query(
            "Warnings/UnknownTag",
            "Tags the extraction engine does not know",
            unknown_tag,
        ),
        ValidatorSpec::query(
            "Warnings/UnknownDirective",
            "Directives the extraction engine does not know",
            unknown_directive,
        ),
        ValidatorSpec::query(
            "Warnings/InvalidTagFormat",
            "Malformed tags",
            invalid_tag_format,
        ),
        ValidatorSpec::query(
            "Warnings/InvalidDirectiveFormat",
            "Malformed directives",
            invalid_directive_format,
        ),
        ValidatorSpec::query(
            "Warnings/DuplicatedParameterName",
            "@param tags naming the same parameter twice",
            duplicated_parameter_name,
        ),
        ValidatorSpec::query(
            "Warnings/UnknownParameterName",
            "@param tags naming parameters the method does not have",
            unknown_parameter_name,
        ),
    ]);

    specs
        .into_iter()
        .map(|spec| match CHILDREN.iter().find(|(id, _)| *id == spec.id().as_str()) {
            Some((_, severity)) => spec.severity(*severity),
            None => spec,
        })
        .collect()
}

/// Render a warning the way the extraction engine prints it.
pub fn warning_line(warning: &ExtractionWarning) -> String {
    format!(
        "[warn]: {} in file `{}` near line {}",
        warning.message.replace('\n', " "),
        to_slash(&warning.file),
        warning.line
    )
}

fn select(ctx: &QueryContext<'_>, marker: &str) -> Vec<String> {
    ctx.warnings()
        .filter(|w| w.message.to_lowercase().contains(marker))
        .map(warning_line)
        .collect()
}

fn unknown_tag(ctx: &QueryContext<'_>) -> Vec<String> {
    select(ctx, "unknown tag")
}

fn unknown_directive(ctx: &QueryContext<'_>) -> Vec<String> {
    select(ctx, "unknown directive")
}

fn invalid_tag_format(ctx: &QueryContext<'_>) -> Vec<String> {
    select(ctx, "invalid tag format")
}

fn invalid_directive_format(ctx: &QueryContext<'_>) -> Vec<String> {
    select(ctx, "invalid directive format")
}

fn duplicated_parameter_name(ctx: &QueryContext<'_>) -> Vec<String> {
    select(ctx, "duplicate parameter name")
}

fn unknown_parameter_name(ctx: &QueryContext<'_>) -> Vec<String> {
    select(ctx, "unknown parameter name")
}
