//! Suppression-set synthesis.
//!
//! [`synthesize`] turns the offenses of a run into per-validator exclusion
//! globs; [`TodoWriter`] writes them to `.tagcheck_todo.yml` and makes the
//! primary configuration inherit that file.

pub mod synthesizer;
pub mod writer;

pub use synthesizer::{
    offenses_by_validator, synthesize, SuppressionEntry, SuppressionPlan, SynthesisOptions,
};
pub use writer::{render, TodoWriter, TODO_FILE_NAME};
