//! Human-readable output formatter.

use std::io::Write;

use console::Style;

use super::ReportFormatter;
use crate::pattern::to_slash;
use crate::report::AggregateResult;
use crate::validators::Severity;

/// Formats check results for terminal display.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
}

impl HumanFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn severity_style(&self, severity: Severity) -> Style {
        let style = Style::new().force_styling(self.use_color);
        if !self.use_color {
            return style;
        }
        match severity {
            Severity::Error => style.red().bold(),
            Severity::Warning => style.yellow(),
            Severity::Convention => style.cyan(),
            Severity::Never => style.dim(),
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn severity_letter(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "E",
        Severity::Warning => "W",
        Severity::Convention => "C",
        Severity::Never => "N",
    }
}

impl ReportFormatter for HumanFormatter {
    fn format<W: Write>(&self, result: &AggregateResult, writer: &mut W) -> std::io::Result<()> {
        for offense in result.offenses() {
            let letter = self.paint(
                self.severity_style(offense.severity()),
                severity_letter(offense.severity()),
            );
            writeln!(
                writer,
                "{}:{}: {}: [{}] {}",
                to_slash(offense.file()),
                offense.line(),
                letter,
                offense.validator(),
                offense.message()
            )?;
        }

        if !result.failures().is_empty() {
            if !result.offenses().is_empty() {
                writeln!(writer)?;
            }
            writeln!(
                writer,
                "{}",
                self.paint(Style::new().red().bold(), "Validators that could not run:")
            )?;
            for failure in result.failures() {
                writeln!(writer, "  {}: {}", failure.validator, failure.message)?;
            }
        }

        let counts = result.counts();
        if !result.offenses().is_empty() || !result.failures().is_empty() {
            writeln!(writer)?;
        }
        writeln!(
            writer,
            "{} file(s) inspected, {} offense(s) found: {} error(s), {} warning(s), {} convention(s)",
            result.files_inspected(),
            counts.total(),
            counts.error,
            counts.warning,
            counts.convention
        )?;

        let coverage = result.coverage();
        write!(
            writer,
            "Documentation coverage: {:.2}% ({}/{} objects)",
            result.coverage_percent(),
            coverage.documented,
            coverage.total
        )?;
        match result.min_coverage() {
            Some(min) => writeln!(writer, ", minimum {:.2}%", min)?,
            None => writeln!(writer)?,
        }

        Ok(())
    }
}
