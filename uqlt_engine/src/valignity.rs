/// UQLT Engine — Valignity
///
/// One positional sweep: PLASMA found strictly inside the center radius
/// is demoted to HELIUM. Everything else is left as it is.

use tracing::debug;

use crate::error::EngineResult;
use crate::grid::Grid;
use crate::state::State;

/// Apply valignity ordering. Returns the number of demoted cells.
pub fn apply_valignity(grid: &mut Grid) -> EngineResult<usize> {
    let boundary = grid.center_radius();
    let mut demoted = 0usize;

    for (row, col) in grid.cells() {
        match grid.get_state(row, col)? {
            State::Plasma if grid.distance_from_center(row, col) < boundary => {
                grid.set_state(row, col, State::Helium)?;
                demoted += 1;
            }
            _ => {}
        }
    }

    debug!(demoted, boundary, "valignity pass");
    Ok(demoted)
}
