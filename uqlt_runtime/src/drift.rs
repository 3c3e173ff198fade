//! Drift detection — determinism verification and grid comparison.

use std::collections::BTreeMap;

use uqlt_engine::{GridSnapshot, State};

use crate::config::RunConfig;
use crate::driver::RunMode;
use crate::error::{RunError, RunResult};
use crate::replay;

/// Run the same configuration twice and require identical hashes.
/// Returns the agreed hash.
pub fn verify_determinism(config: &RunConfig, mode: RunMode) -> RunResult<String> {
    let first = replay::rebuild_hash(config, mode)?;
    let second = replay::rebuild_hash(config, mode)?;
    if first != second {
        return Err(RunError::Determinism { first, second });
    }
    Ok(first)
}

/// Structured difference between two grids of the same size.
pub fn compare_snapshots(a: &GridSnapshot, b: &GridSnapshot) -> RunResult<DriftReport> {
    if a.size != b.size {
        return Err(RunError::SnapshotSizeMismatch {
            left: a.size,
            right: b.size,
        });
    }

    let counts_a = a.state_counts();
    let counts_b = b.state_counts();
    let state_count_delta: BTreeMap<State, i64> = State::ALL
        .iter()
        .map(|&s| {
            let before = counts_a.get(&s).copied().unwrap_or(0) as i64;
            let after = counts_b.get(&s).copied().unwrap_or(0) as i64;
            (s, after - before)
        })
        .filter(|&(_, delta)| delta != 0)
        .collect();

    let mut state_changes = Vec::new();
    let mut energy_changed_cells = 0usize;
    for (idx, (sa, sb)) in a.states.iter().zip(&b.states).enumerate() {
        let cell = (idx / a.size, idx % a.size);
        if sa != sb {
            state_changes.push(CellChange {
                cell,
                from: *sa,
                to: *sb,
            });
        }
        if a.energy[idx] != b.energy[idx] {
            energy_changed_cells += 1;
        }
    }

    let total_energy_a = a.total_energy();
    let total_energy_b = b.total_energy();

    Ok(DriftReport {
        size: a.size,
        state_count_delta,
        total_energy_a,
        total_energy_b,
        total_energy_delta: total_energy_b - total_energy_a,
        state_changes,
        energy_changed_cells,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub cell: (usize, usize),
    pub from: State,
    pub to: State,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    pub size: usize,
    /// Count change per state, `b - a`. States with no change are omitted.
    pub state_count_delta: BTreeMap<State, i64>,
    pub total_energy_a: f64,
    pub total_energy_b: f64,
    pub total_energy_delta: f64,
    /// Cells whose state differs, row-major.
    pub state_changes: Vec<CellChange>,
    pub energy_changed_cells: usize,
}

impl DriftReport {
    /// True when neither states nor energies differ.
    pub fn is_empty(&self) -> bool {
        self.state_changes.is_empty() && self.energy_changed_cells == 0
    }
}
