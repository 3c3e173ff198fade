/// UQLT Engine — Grid Integrity Checks
///
/// Hard-fail validation. Each check returns the first violation found.
/// Closed state-set membership needs no runtime check: a `State` value
/// outside the enumeration is unrepresentable once it is inside a Grid.
/// Size and array shape are fixed by `Grid::new` and `Grid::from_snapshot`,
/// so only the energy values are checked here.

use crate::error::{EngineError, EngineResult};
use crate::grid::Grid;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all grid checks. `Err` on the first failure.
pub fn try_validate_grid(grid: &Grid) -> EngineResult<()> {
    check_finite_energy(grid)?;
    check_non_negative_energy(grid)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_finite_energy(grid: &Grid) -> EngineResult<()> {
    for ((row, col), e) in grid.cells().zip(grid.energies()) {
        if !e.is_finite() {
            return Err(EngineError::IllegalGrid(format!(
                "[INVARIANT:finite_energy] cell ({}, {}) holds {}",
                row, col, e
            )));
        }
    }
    Ok(())
}

fn check_non_negative_energy(grid: &Grid) -> EngineResult<()> {
    for ((row, col), e) in grid.cells().zip(grid.energies()) {
        if *e < 0.0 {
            return Err(EngineError::IllegalGrid(format!(
                "[INVARIANT:non_negative_energy] cell ({}, {}) holds {}",
                row, col, e
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSnapshot;
    use crate::state::State;

    #[test]
    fn test_fresh_grid_passes() {
        let grid = Grid::new(7).unwrap();
        try_validate_grid(&grid).unwrap();
    }

    #[test]
    fn test_nan_energy_reported_with_tag() {
        let snap = GridSnapshot {
            size: 1,
            states: vec![State::Static],
            energy: vec![f64::NAN],
        };
        match Grid::from_snapshot(snap) {
            Err(EngineError::IllegalGrid(msg)) => {
                assert!(msg.contains("[INVARIANT:finite_energy]"), "{}", msg)
            }
            other => panic!("expected IllegalGrid, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_energy_reported_with_cell() {
        let snap = GridSnapshot {
            size: 3,
            states: vec![State::Static; 9],
            energy: vec![0.0, 0.0, 0.0, 0.0, 0.0, -2.0, 0.0, 0.0, 0.0],
        };
        match Grid::from_snapshot(snap) {
            Err(EngineError::IllegalGrid(msg)) => {
                assert!(msg.contains("[INVARIANT:non_negative_energy]"), "{}", msg);
                assert!(msg.contains("(1, 2)"), "{}", msg);
            }
            other => panic!("expected IllegalGrid, got {:?}", other),
        }
    }
}
