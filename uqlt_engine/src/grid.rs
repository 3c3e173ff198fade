/// UQLT Engine — Grid
///
/// The N×N lattice (N odd) holding one State and one non-negative
/// energy per cell. The sole mutable resource of a run; every pass
/// reads and writes it through the checked accessors below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::invariants::try_validate_grid;
use crate::state::State;

/// Owned, read-only copy of a grid. Never aliases the live grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSnapshot {
    pub size: usize,
    /// Row-major.
    pub states: Vec<State>,
    /// Row-major.
    pub energy: Vec<f64>,
}

impl GridSnapshot {
    pub fn state_at(&self, row: usize, col: usize) -> Option<State> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.states.get(row * self.size + col).copied()
    }

    pub fn energy_at(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.energy.get(row * self.size + col).copied()
    }

    /// Cell count per state, same shape as `Grid::state_counts`.
    pub fn state_counts(&self) -> BTreeMap<State, usize> {
        count_states(&self.states)
    }

    pub fn total_energy(&self) -> f64 {
        self.energy.iter().sum()
    }
}

/// Row-major coordinate sequence over a grid of a given size.
///
/// Finite and deterministic; call `Grid::cells` again (or clone) to restart.
#[derive(Debug, Clone)]
pub struct CellIter {
    size: usize,
    next: usize,
}

impl Iterator for CellIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.size * self.size {
            return None;
        }
        let cell = (self.next / self.size, self.next % self.size);
        self.next += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size * self.size - self.next.min(self.size * self.size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellIter {}

#[derive(Debug, Clone)]
pub struct Grid {
    size: usize,
    center: usize,
    states: Vec<State>,
    energy: Vec<f64>,
}

impl Grid {
    /// Create an all-VOID, zero-energy grid. `size` must be positive and odd.
    pub fn new(size: usize) -> EngineResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(EngineError::GridSize { size: size as i64 });
        }
        // The energy array must fit the allocator's isize limit.
        let cells = size
            .checked_mul(size)
            .filter(|&n| {
                n.checked_mul(std::mem::size_of::<f64>())
                    .map_or(false, |bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(EngineError::GridSize {
                size: i64::try_from(size).unwrap_or(i64::MAX),
            })?;
        Ok(Self {
            size,
            center: size / 2,
            states: vec![State::Void; cells],
            energy: vec![0.0; cells],
        })
    }

    /// Rebuild a grid from a snapshot, re-checking shape and integrity.
    pub fn from_snapshot(snapshot: GridSnapshot) -> EngineResult<Self> {
        let mut grid = Grid::new(snapshot.size)?;
        let expected = snapshot.size * snapshot.size;
        if snapshot.states.len() != expected || snapshot.energy.len() != expected {
            return Err(EngineError::SnapshotShape {
                size: snapshot.size,
                expected,
                states: snapshot.states.len(),
                energy: snapshot.energy.len(),
            });
        }
        grid.states = snapshot.states;
        grid.energy = snapshot.energy;
        grid.validate()?;
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the central row and column.
    pub fn center(&self) -> usize {
        self.center
    }

    /// The center index read as a radius; the valignity boundary.
    pub fn center_radius(&self) -> f64 {
        self.center as f64
    }

    fn index(&self, row: usize, col: usize) -> EngineResult<usize> {
        if row >= self.size || col >= self.size {
            return Err(EngineError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        Ok(row * self.size + col)
    }

    pub fn get_state(&self, row: usize, col: usize) -> EngineResult<State> {
        let idx = self.index(row, col)?;
        Ok(self.states[idx])
    }

    /// Set a cell's state. Setting VOID also zeroes the cell's energy.
    pub fn set_state(&mut self, row: usize, col: usize, state: State) -> EngineResult<()> {
        let idx = self.index(row, col)?;
        self.states[idx] = state;
        if state.is_void() {
            self.energy[idx] = 0.0;
        }
        Ok(())
    }

    pub fn get_energy(&self, row: usize, col: usize) -> EngineResult<f64> {
        let idx = self.index(row, col)?;
        Ok(self.energy[idx])
    }

    /// Add `delta` (possibly negative) and return the new energy.
    ///
    /// Fails without mutating if the result would be negative or non-finite.
    pub fn add_energy(&mut self, row: usize, col: usize, delta: f64) -> EngineResult<f64> {
        let idx = self.index(row, col)?;
        let next = self.energy[idx] + delta;
        if !next.is_finite() {
            return Err(EngineError::NonFiniteEnergy { row, col });
        }
        if next < 0.0 {
            return Err(EngineError::NegativeEnergy {
                row,
                col,
                energy: next,
            });
        }
        self.energy[idx] = next;
        Ok(next)
    }

    /// Overwrite a cell's energy. Same post-conditions as `add_energy`.
    pub fn set_energy(&mut self, row: usize, col: usize, value: f64) -> EngineResult<()> {
        let idx = self.index(row, col)?;
        if !value.is_finite() {
            return Err(EngineError::NonFiniteEnergy { row, col });
        }
        if value < 0.0 {
            return Err(EngineError::NegativeEnergy {
                row,
                col,
                energy: value,
            });
        }
        self.energy[idx] = value;
        Ok(())
    }

    /// Euclidean distance between two cells.
    pub fn distance_between(a: (usize, usize), b: (usize, usize)) -> f64 {
        let dr = a.0 as f64 - b.0 as f64;
        let dc = a.1 as f64 - b.1 as f64;
        (dr * dr + dc * dc).sqrt()
    }

    pub fn distance_from_center(&self, row: usize, col: usize) -> f64 {
        Self::distance_between((row, col), (self.center, self.center))
    }

    /// All coordinates, row-major.
    pub fn cells(&self) -> CellIter {
        CellIter {
            size: self.size,
            next: 0,
        }
    }

    /// Square neighbourhood of `radius` around `(row, col)`, clipped at the
    /// edges, centre included, row-major.
    pub fn neighborhood(
        &self,
        row: usize,
        col: usize,
        radius: usize,
    ) -> EngineResult<impl Iterator<Item = (usize, usize)>> {
        self.index(row, col)?;
        let r0 = row.saturating_sub(radius);
        let r1 = row.saturating_add(radius).min(self.size - 1);
        let c0 = col.saturating_sub(radius);
        let c1 = col.saturating_add(radius).min(self.size - 1);
        Ok((r0..=r1).flat_map(move |r| (c0..=c1).map(move |c| (r, c))))
    }

    /// Cell count per state. Every state appears, absent ones with 0.
    pub fn state_counts(&self) -> BTreeMap<State, usize> {
        count_states(&self.states)
    }

    pub fn total_energy(&self) -> f64 {
        self.energy.iter().sum()
    }

    /// Deep copy of the full state and energy arrays.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            size: self.size,
            states: self.states.clone(),
            energy: self.energy.clone(),
        }
    }

    pub(crate) fn energies(&self) -> &[f64] {
        &self.energy
    }

    /// First integrity violation, if any.
    pub fn validate(&self) -> EngineResult<()> {
        try_validate_grid(self)
    }

    /// Fatal integrity check for drivers.
    pub fn is_illegal(&self) -> bool {
        self.validate().is_err()
    }
}

pub(crate) fn count_states(states: &[State]) -> BTreeMap<State, usize> {
    let mut counts: BTreeMap<State, usize> = State::ALL.iter().map(|s| (*s, 0)).collect();
    for s in states {
        *counts.entry(*s).or_insert(0) += 1;
    }
    counts
}
