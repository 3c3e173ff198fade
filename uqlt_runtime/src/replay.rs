//! Replay — rebuild a run's final grid from its configuration alone.
//!
//! A run is a pure function of (config, mode): there is no event log to
//! read, so replay means running again from a fresh seed.

use uqlt_engine::GridSnapshot;

use crate::config::RunConfig;
use crate::driver::{run, RunMode};
use crate::error::RunResult;

/// Re-run from scratch. Returns `(final_snapshot, canonical_hash)`.
pub fn rebuild_state(config: &RunConfig, mode: RunMode) -> RunResult<(GridSnapshot, String)> {
    let report = run(config, mode)?;
    Ok((report.final_snapshot, report.final_hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(config: &RunConfig, mode: RunMode) -> RunResult<String> {
    let (_, hash) = rebuild_state(config, mode)?;
    Ok(hash)
}
