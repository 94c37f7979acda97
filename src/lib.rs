//! tagcheck - A documentation-quality linter for tag-annotated docstrings.
//!
//! tagcheck runs a registry of validators over the documentation index of
//! a project, reports offenses with configurable severities and can
//! record the current offenses as suppressions so a legacy codebase can
//! adopt it gradually.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, inheritance and setting resolution
//! - [`docs`] - The documentation index and where it comes from
//! - [`error`] - Error types and result aliases
//! - [`git`] - Version-control file selection
//! - [`output`] - Human and JSON report formatters
//! - [`pattern`] - Path glob matching
//! - [`report`] - Offense decoding, assembly and aggregation
//! - [`runner`] - Validator orchestration
//! - [`shell`] - External process execution
//! - [`templates`] - Embedded starter configurations
//! - [`todo`] - Suppression file generation
//! - [`ui`] - Spinners and terminal output
//! - [`validators`] - Validator registry and built-in validators
//!
//! # Example
//!
//! ```
//! use tagcheck::config::{ConfigStore, RawConfig};
//! use tagcheck::validators::{builtin, Severity};
//!
//! let raw = RawConfig::from_yaml("AllValidators:\n  Severity: error\nTags/Order:\n  Severity: convention\n").unwrap();
//! let store = ConfigStore::new(&raw, builtin(), &[]).unwrap();
//!
//! assert_eq!(store.severity("Tags/Order"), Severity::Convention);
//! assert_eq!(store.severity("Tags/TypeSyntax"), Severity::Error);
//! ```
//!
//! For file-based config loading, see the integration tests.

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod git;
pub mod output;
pub mod pattern;
pub mod report;
pub mod runner;
pub mod shell;
pub mod templates;
pub mod todo;
pub mod ui;
pub mod validators;

pub use error::{Result, TagcheckError};
