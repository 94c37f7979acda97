//! Validator orchestration.
//!
//! [`check`] is the whole pipeline for one run: select files, invoke the
//! enabled validators, assemble their output and compute coverage.

pub mod files;
pub mod orchestrator;

pub use files::{directory_file_counts, discover_files, restrict_to_targets, FileSelector};
pub use orchestrator::{RawRecord, RunOutcome, Runner, ValidatorFailure};

use std::path::{Path, PathBuf};

use crate::config::ConfigStore;
use crate::docs::DocumentationSource;
use crate::report::{AggregateResult, Coverage, DecoderRegistry, ResultAssembler};

/// Run every enabled validator over `candidates` (relative paths) and
/// build the aggregate result.
pub fn check(
    store: &ConfigStore,
    root: &Path,
    candidates: Vec<PathBuf>,
    source: &dyn DocumentationSource,
) -> AggregateResult {
    let selector = FileSelector::new(candidates, &store.global_exclude());
    let in_scope = selector.globally_in_scope();

    let outcome = Runner::new(store, root, source).run(&selector);

    let decoders = DecoderRegistry::builtin(store.registry());
    let offenses = ResultAssembler::new(store, &decoders).assemble(&outcome.ran, &outcome.records);

    let coverage = outcome
        .index
        .as_ref()
        .map(|index| Coverage::compute(index, &in_scope, store.global_visibility()))
        .unwrap_or_default();

    AggregateResult::new(
        offenses,
        outcome.failures,
        coverage,
        in_scope.len(),
        store.fail_on_severity(),
        store.min_coverage(),
    )
}

