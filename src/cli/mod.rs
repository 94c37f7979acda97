//! Command-line interface for tagcheck.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands, InitArgs, TodoArgs, ValidatorsArgs};
pub use commands::{report_error, Command, CommandDispatcher, CommandResult, FATAL_EXIT_CODE};
