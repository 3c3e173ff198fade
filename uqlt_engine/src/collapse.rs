/// UQLT Engine — Helium-Dominance Collapse
///
/// A non-VOID, non-CORE cell whose neighbourhood is dominated by
/// helium-family states is forced straight to CORE. Collapse is batched:
/// the qualifying set is computed from the pre-pass grid, then applied
/// all at once.

use tracing::{debug, info};

use crate::config::EngineConstants;
use crate::error::EngineResult;
use crate::grid::Grid;
use crate::state::State;

/// Neighbourhood radius used when the caller has no preference.
pub const DEFAULT_COLLAPSE_RADIUS: usize = 1;

/// Fraction of non-VOID cells in the clipped square neighbourhood of
/// `(row, col)` (centre included) that belong to the helium family.
///
/// `0.0` when the neighbourhood holds no non-VOID cell.
pub fn local_helium_fraction(
    grid: &Grid,
    row: usize,
    col: usize,
    radius: usize,
) -> EngineResult<f64> {
    let mut occupied = 0usize;
    let mut helium = 0usize;
    for (r, c) in grid.neighborhood(row, col, radius)? {
        let state = grid.get_state(r, c)?;
        if state.is_void() {
            continue;
        }
        occupied += 1;
        if state.is_helium_family() {
            helium += 1;
        }
    }
    if occupied == 0 {
        return Ok(0.0);
    }
    Ok(helium as f64 / occupied as f64)
}

/// Cells that would collapse if a pass ran now, row-major. Read-only.
pub fn find_collapse_candidates(
    grid: &Grid,
    constants: &EngineConstants,
    radius: usize,
) -> EngineResult<Vec<(usize, usize)>> {
    let mut candidates = Vec::new();
    for (row, col) in grid.cells() {
        let state = grid.get_state(row, col)?;
        if state.is_void() || state.is_core() {
            continue;
        }
        let fraction = local_helium_fraction(grid, row, col, radius)?;
        if fraction >= constants.collapse_helium_threshold {
            candidates.push((row, col));
        }
    }
    Ok(candidates)
}

/// Run one collapse pass. Returns the number of cells collapsed; `0`
/// means nothing qualified.
pub fn enforce_collapse(
    grid: &mut Grid,
    constants: &EngineConstants,
    radius: usize,
) -> EngineResult<usize> {
    let candidates = find_collapse_candidates(grid, constants, radius)?;
    let core_energy = constants.max_energy(State::Core);

    for &(row, col) in &candidates {
        grid.set_state(row, col, State::Core)?;
        grid.set_energy(row, col, core_energy)?;
    }

    if candidates.is_empty() {
        debug!(radius, "collapse pass: no qualifying cells");
    } else {
        info!(collapsed = candidates.len(), radius, "collapse pass");
    }
    Ok(candidates.len())
}
