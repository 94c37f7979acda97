//! JSON output formatter.
//!
//! Formats check results as machine-readable JSON for tooling integration.

use std::io::Write;

use serde::Serialize;

use super::ReportFormatter;
use crate::report::{AggregateResult, Coverage, Offense, SeverityCounts};
use crate::runner::ValidatorFailure;
use crate::validators::Severity;

/// Formats check results as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    offenses: &'a [Offense],
    failures: &'a [ValidatorFailure],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    files_inspected: usize,
    offenses: SeverityCounts,
    coverage: Coverage,
    coverage_percent: f64,
    fail_on_severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_coverage: Option<f64>,
    passed: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for JsonFormatter {
    fn format<W: Write>(&self, result: &AggregateResult, writer: &mut W) -> std::io::Result<()> {
        let output = JsonOutput {
            offenses: result.offenses(),
            failures: result.failures(),
            summary: JsonSummary {
                files_inspected: result.files_inspected(),
                offenses: result.counts(),
                coverage: result.coverage(),
                coverage_percent: result.coverage_percent(),
                fail_on_severity: result.fail_on(),
                min_coverage: result.min_coverage(),
                passed: result.passed(),
            },
        };

        serde_json::to_writer_pretty(&mut *writer, &output).map_err(std::io::Error::other)?;
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ValidatorId;

    fn render(result: &AggregateResult) -> serde_json::Value {
        let mut output = Vec::new();
        JsonFormatter::new().format(result, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn serializes_offenses_and_summary() {
        let result = AggregateResult::new(
            vec![Offense::new(
                ValidatorId::new("Warnings/UnknownTag"),
                Severity::Error,
                "Unknown tag @fixme",
                "lib/a.rb",
                3,
                None,
            )],
            Vec::new(),
            Coverage {
                documented: 1,
                total: 2,
            },
            1,
            Severity::Warning,
            None,
        );

        insta::assert_json_snapshot!(render(&result), @r#"
        {
          "failures": [],
          "offenses": [
            {
              "file": "lib/a.rb",
              "line": 3,
              "message": "Unknown tag @fixme",
              "severity": "error",
              "validator": "Warnings/UnknownTag"
            }
          ],
          "summary": {
            "coverage": {
              "documented": 1,
              "total": 2
            },
            "coverage_percent": 50.0,
            "fail_on_severity": "warning",
            "files_inspected": 1,
            "offenses": {
              "convention": 0,
              "error": 1,
              "warning": 0
            },
            "passed": false
          }
        }
        "#);
    }

    #[test]
    fn includes_minimum_coverage_when_set() {
        let result = AggregateResult::new(
            Vec::new(),
            Vec::new(),
            Coverage::default(),
            0,
            Severity::Error,
            Some(80.0),
        );

        let json = render(&result);
        assert_eq!(json["summary"]["min_coverage"], 80.0);
        assert_eq!(json["summary"]["passed"], true);
    }
}
