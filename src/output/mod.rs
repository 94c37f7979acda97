//! Report formatters.
//!
//! This module renders an [`AggregateResult`](crate::report::AggregateResult)
//! for people (`human`) or tools (`json`).

pub mod human;
pub mod json;

use std::io::Write;
use std::str::FromStr;

use crate::report::AggregateResult;

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}', expected human or json", other)),
        }
    }
}

/// Trait for formatting check results.
pub trait ReportFormatter {
    /// Format the result to the given writer.
    fn format<W: Write>(&self, result: &AggregateResult, writer: &mut W) -> std::io::Result<()>;
}

pub use human::HumanFormatter;
pub use json::JsonFormatter;
