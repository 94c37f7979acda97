//! Error types for tagcheck operations.
//!
//! This module defines [`TagcheckError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration problems are collected into [`ConfigIssue`]s and reported
//!   together through [`TagcheckError::InvalidConfig`]
//! - Failures of a single validator never become a `TagcheckError`; they are
//!   recorded in the run's aggregate result instead
//! - Use `anyhow::Error` (via `TagcheckError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tagcheck operations.
#[derive(Debug, Error)]
pub enum TagcheckError {
    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}. Run 'tagcheck init' to create one.")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// One or more configuration errors found while validating a load.
    #[error("Invalid configuration ({} error(s)):\n{}", issues.len(), format_issues(issues))]
    InvalidConfig { issues: Vec<ConfigIssue> },

    /// Configuration inheritance loops back on itself.
    #[error("Circular dependency detected in configuration inheritance: {cycle}")]
    CircularInheritance { cycle: String },

    /// A path given to lint or to generate suppressions for does not exist.
    #[error("Target path does not exist: {path}")]
    TargetNotFound { path: PathBuf },

    /// A suppression document already exists and regeneration was not requested.
    #[error("Suppression file already exists: {path}. Use --regenerate to overwrite it.")]
    SuppressionExists { path: PathBuf },

    /// The documentation extraction engine could not produce an index.
    #[error("Documentation extraction failed: {message}")]
    Extraction { message: String },

    /// A version-control query failed.
    #[error("git query failed: {message}")]
    Git { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Where the problem is, e.g. `Tags/Order.Severity`.
    pub location: String,
    /// What is wrong.
    pub message: String,
    /// Near-miss suggestion, if one was found.
    pub suggestion: Option<String>,
}

impl ConfigIssue {
    /// Create an issue without a suggestion.
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a "did you mean" suggestion.
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type alias for tagcheck operations.
pub type Result<T> = std::result::Result<T, TagcheckError>;
