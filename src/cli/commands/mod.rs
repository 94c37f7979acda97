//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that run validators
//! share their setup through [`project::Project`].

pub mod check;
pub mod dispatcher;
pub mod init;
pub mod project;
pub mod todo;
pub mod validators;

pub use dispatcher::{report_error, Command, CommandDispatcher, CommandResult, FATAL_EXIT_CODE};
