//! The result of a whole run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::offense::Offense;
use crate::docs::{DocIndex, VisibilityLevel};
use crate::runner::ValidatorFailure;
use crate::validators::Severity;

/// Documented objects out of all objects in scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub documented: usize,
    pub total: usize,
}

impl Coverage {
    /// Count objects declared in `files` and visible at `visibility`.
    pub fn compute(index: &DocIndex, files: &BTreeSet<PathBuf>, visibility: VisibilityLevel) -> Self {
        let (documented, total) = index
            .objects()
            .iter()
            .filter(|o| files.contains(&o.file) && visibility.includes(o.visibility))
            .fold((0, 0), |(documented, total), o| {
                (documented + usize::from(o.is_documented()), total + 1)
            });
        Self { documented, total }
    }

    /// Percentage of documented objects; 100 when there is nothing to
    /// document.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.documented as f64 * 100.0 / self.total as f64
        }
    }
}

/// Offense counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub convention: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.error + self.warning + self.convention
    }
}

/// Offenses, failures and coverage of one run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    offenses: Vec<Offense>,
    failures: Vec<ValidatorFailure>,
    coverage: Coverage,
    files_inspected: usize,
    fail_on: Severity,
    min_coverage: Option<f64>,
}

impl AggregateResult {
    /// Offenses are sorted by file, line, then validator id.
    pub fn new(
        mut offenses: Vec<Offense>,
        failures: Vec<ValidatorFailure>,
        coverage: Coverage,
        files_inspected: usize,
        fail_on: Severity,
        min_coverage: Option<f64>,
    ) -> Self {
        offenses.sort_by(|a, b| {
            a.file()
                .cmp(b.file())
                .then(a.line().cmp(&b.line()))
                .then_with(|| a.validator().as_str().cmp(b.validator().as_str()))
        });
        Self {
            offenses,
            failures,
            coverage,
            files_inspected,
            fail_on,
            min_coverage,
        }
    }

    pub fn offenses(&self) -> &[Offense] {
        &self.offenses
    }

    pub fn failures(&self) -> &[ValidatorFailure] {
        &self.failures
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    pub fn coverage_percent(&self) -> f64 {
        self.coverage.percent()
    }

    pub fn files_inspected(&self) -> usize {
        self.files_inspected
    }

    pub fn fail_on(&self) -> Severity {
        self.fail_on
    }

    pub fn min_coverage(&self) -> Option<f64> {
        self.min_coverage
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for offense in &self.offenses {
            match offense.severity() {
                Severity::Error => counts.error += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Convention => counts.convention += 1,
                Severity::Never => {}
            }
        }
        counts
    }

    /// Offenses grouped by validator id.
    pub fn by_validator(&self) -> BTreeMap<&str, Vec<&Offense>> {
        let mut grouped: BTreeMap<&str, Vec<&Offense>> = BTreeMap::new();
        for offense in &self.offenses {
            grouped
                .entry(offense.validator().as_str())
                .or_default()
                .push(offense);
        }
        grouped
    }

    /// Distinct files with at least one offense, sorted.
    pub fn offending_files(&self) -> Vec<&Path> {
        let files: BTreeSet<&Path> = self.offenses.iter().map(Offense::file).collect();
        files.into_iter().collect()
    }

    /// Whether some offense is at or above the failure threshold.
    pub fn has_failing_offense(&self) -> bool {
        self.fail_on != Severity::Never && self.offenses.iter().any(|o| o.severity() >= self.fail_on)
    }

    /// Whether coverage is below the required minimum.
    pub fn below_min_coverage(&self) -> bool {
        self.min_coverage
            .is_some_and(|min| self.coverage_percent() < min)
    }

    /// No offense at or above the threshold and coverage high enough.
    /// Validator failures are reported but do not decide the outcome.
    pub fn passed(&self) -> bool {
        !self.has_failing_offense() && !self.below_min_coverage()
    }
}
