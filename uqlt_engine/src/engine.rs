/// UQLT Engine — Simulation Context
///
/// Owns the grid and the run's constants. Delegates every mutation to
/// the pass modules and enforces the per-run ordering:
///
///   transition -> collapse -> (on collapse) emission -> valignity -> finished
///
/// Valignity runs at most once. No step is accepted after the run finished.

use std::collections::BTreeMap;

use tracing::info;

use crate::collapse::{enforce_collapse, DEFAULT_COLLAPSE_RADIUS};
use crate::config::EngineConstants;
use crate::emission::{compute_radial_energy_profile, emit_from_cores, EmissionSummary};
use crate::error::{EngineError, EngineResult};
use crate::grid::{Grid, GridSnapshot};
use crate::hashing::canonical_hash;
use crate::transitions::{advance_grid, TransitionSummary};
use crate::valignity::apply_valignity;

/// Result of one `Simulation::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// 1-based step number.
    pub step: u64,
    pub transitions: TransitionSummary,
    /// Cells collapsed this step; `0` means the loop continues.
    pub collapsed: usize,
    /// Present only on the collapsing step.
    pub emission: Option<EmissionSummary>,
    /// Present only on the collapsing step.
    pub demoted: Option<usize>,
}

/// One simulation run.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    constants: EngineConstants,
    collapse_radius: usize,
    steps: u64,
    finished: bool,
    valignity_applied: bool,
}

impl Simulation {
    /// Fresh all-VOID grid of `size` with validated constants.
    pub fn new(size: usize, constants: EngineConstants) -> EngineResult<Self> {
        Self::with_grid(Grid::new(size)?, constants)
    }

    /// Start a run from an existing grid (seeded by a driver, or restored).
    pub fn with_grid(grid: Grid, constants: EngineConstants) -> EngineResult<Self> {
        constants.validate()?;
        grid.validate()?;
        Ok(Self {
            grid,
            constants,
            collapse_radius: DEFAULT_COLLAPSE_RADIUS,
            steps: 0,
            finished: false,
            valignity_applied: false,
        })
    }

    pub fn with_collapse_radius(mut self, radius: usize) -> Self {
        self.collapse_radius = radius;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for drivers (seeding, energy input).
    /// All writes still go through the grid's checked accessors.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn constants(&self) -> &EngineConstants {
        &self.constants
    }

    pub fn collapse_radius(&self) -> usize {
        self.collapse_radius
    }

    /// Steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn transition_pass(&mut self) -> EngineResult<TransitionSummary> {
        advance_grid(&mut self.grid, &self.constants)
    }

    pub fn collapse_pass(&mut self) -> EngineResult<usize> {
        enforce_collapse(&mut self.grid, &self.constants, self.collapse_radius)
    }

    pub fn emission_pass(&mut self) -> EngineResult<EmissionSummary> {
        emit_from_cores(&mut self.grid, &self.constants)
    }

    /// Apply valignity. Fails on a second call within the same run.
    pub fn valignity_pass(&mut self) -> EngineResult<usize> {
        if self.valignity_applied {
            return Err(EngineError::ValignityAlreadyApplied);
        }
        let demoted = apply_valignity(&mut self.grid)?;
        self.valignity_applied = true;
        Ok(demoted)
    }

    /// One iteration of the driver loop:
    ///   1. transition pass
    ///   2. collapse pass
    ///   3. if anything collapsed: mark finished, emission, valignity
    ///
    /// Refused before any mutation once valignity has been applied. After
    /// a collapse the run is finished even if a later pass fails.
    pub fn step(&mut self) -> EngineResult<StepOutcome> {
        if self.finished {
            return Err(EngineError::RunFinished);
        }
        if self.valignity_applied {
            return Err(EngineError::ValignityAlreadyApplied);
        }
        self.steps += 1;

        let transitions = self.transition_pass()?;
        let collapsed = self.collapse_pass()?;

        let mut outcome = StepOutcome {
            step: self.steps,
            transitions,
            collapsed,
            emission: None,
            demoted: None,
        };

        if collapsed > 0 {
            self.finished = true;
            outcome.emission = Some(self.emission_pass()?);
            outcome.demoted = Some(self.valignity_pass()?);
            info!(step = self.steps, collapsed, "run finished on collapse");
        }

        Ok(outcome)
    }

    /// Integrity check; `Err(IllegalGrid)` is fatal to the run.
    pub fn check_integrity(&self) -> EngineResult<()> {
        self.grid.validate()
    }

    pub fn is_illegal(&self) -> bool {
        self.grid.is_illegal()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot()
    }

    /// Canonical hash of the current grid.
    pub fn hash(&self) -> EngineResult<String> {
        canonical_hash(&self.grid.snapshot())
    }

    pub fn radial_profile(&self) -> EngineResult<BTreeMap<u64, f64>> {
        compute_radial_energy_profile(&self.grid)
    }
}
