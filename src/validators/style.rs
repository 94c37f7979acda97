//! `Style/*` validators backed by external tools.
//!
//! The tool is run as `<Command...> <Options...> <files...>` and is expected
//! to print `path:line[:col]: message` lines.

use super::rule::{Execution, Severity, ValidatorSpec};

/// Setting holding the program and its fixed arguments.
pub const COMMAND: &str = "Command";

pub fn validators() -> Vec<ValidatorSpec> {
    vec![ValidatorSpec::new(
        "Style/ExternalTool",
        "Findings of an external style checker",
        Execution::Process,
    )
    .enabled(false)
    .severity(Severity::Convention)
    .list_setting(COMMAND, &[])]
}
