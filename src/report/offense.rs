//! Offense records.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::validators::{Severity, ValidatorId};

/// One problem found by one validator.
///
/// Offenses are created by the result assembler and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offense {
    validator: ValidatorId,
    severity: Severity,
    message: String,
    file: PathBuf,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
}

impl Offense {
    pub fn new(
        validator: ValidatorId,
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
        object: Option<String>,
    ) -> Self {
        Self {
            validator,
            severity,
            message: message.into(),
            file: file.into(),
            line,
            object,
        }
    }

    pub fn validator(&self) -> &ValidatorId {
        &self.validator
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Qualified name of the object the offense is about, if known.
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }
}

/// What a decoder pulls out of one line of raw output, before the
/// assembler attaches validator and severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine {
    pub file: PathBuf,
    pub line: usize,
    pub message: String,
    pub object: Option<String>,
}

impl DecodedLine {
    /// Turn into an offense for `validator` at `severity`.
    pub fn into_offense(self, validator: ValidatorId, severity: Severity) -> Offense {
        Offense::new(
            validator,
            severity,
            self.message,
            self.file,
            self.line,
            self.object,
        )
    }
}
