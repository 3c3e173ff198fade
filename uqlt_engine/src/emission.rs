/// UQLT Engine — EMN Emission
///
/// Energy emitted by CORE cells into every other cell of the grid.
///
/// Enforced properties:
///   - only CORE cells emit
///   - magnitude min(CORE_EMISSION_RATE / d, C_SQUARED_MAX_MOTION), d = distance to the core
///   - weakening is monotonic in d and never exceeds the cap
///   - contributions are non-negative and accumulate across cores
///   - a core never emits to itself

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConstants;
use crate::error::EngineResult;
use crate::grid::Grid;

/// Emission magnitude at `distance` from a core. Zero for `distance <= 0`.
pub fn emission_amount(distance: f64, constants: &EngineConstants) -> f64 {
    if distance.is_nan() || distance <= 0.0 {
        return 0.0;
    }
    (constants.core_emission_rate / distance).min(constants.c_squared_max_motion)
}

/// Totals for one emission pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionSummary {
    /// Number of emitting cores.
    pub cores: usize,
    /// Core-to-cell contributions applied.
    pub receivers: usize,
    /// Sum of all energy added, the EMN output of the pass.
    pub total_emitted: f64,
}

/// Emit from every CORE cell. The set of emitters is fixed before any
/// energy moves; emitters are processed in row-major order.
pub fn emit_from_cores(grid: &mut Grid, constants: &EngineConstants) -> EngineResult<EmissionSummary> {
    let mut cores: Vec<(usize, usize)> = Vec::new();
    for (row, col) in grid.cells() {
        if grid.get_state(row, col)?.is_core() {
            cores.push((row, col));
        }
    }

    let mut summary = EmissionSummary {
        cores: cores.len(),
        ..Default::default()
    };

    for &core in &cores {
        for cell in grid.cells() {
            if cell == core {
                continue;
            }
            let amount = emission_amount(Grid::distance_between(core, cell), constants);
            grid.add_energy(cell.0, cell.1, amount)?;
            summary.receivers += 1;
            summary.total_emitted += amount;
        }
    }

    info!(
        cores = summary.cores,
        total_emitted = summary.total_emitted,
        "emission pass"
    );
    Ok(summary)
}

/// Mean energy per integer-rounded distance from the grid center. Read-only.
pub fn compute_radial_energy_profile(grid: &Grid) -> EngineResult<BTreeMap<u64, f64>> {
    let mut bins: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for (row, col) in grid.cells() {
        let r = grid.distance_from_center(row, col).round() as u64;
        let energy = grid.get_energy(row, col)?;
        let bin = bins.entry(r).or_insert((0.0, 0));
        bin.0 += energy;
        bin.1 += 1;
    }
    Ok(bins
        .into_iter()
        .map(|(r, (sum, n))| (r, sum / n as f64))
        .collect())
}
