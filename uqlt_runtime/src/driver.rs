//! Run drivers — the three loops that take a configured grid to an end.
//!
//!   stage-chain  record -> ambient input -> step -> integrity check
//!   collapse     collapse passes only, on the seeded grid
//!   emn          collapse passes, then one emission pass
//!
//! Every rule lives in the kernel; the drivers only order the calls,
//! keep history and decide when to stop. A failed integrity check
//! aborts the run with `RunError::IllegalState`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{error, info, warn};

use uqlt_engine::emission::EmissionSummary;
use uqlt_engine::{Grid, GridSnapshot, Simulation, State};

use crate::config::RunConfig;
use crate::error::{RunError, RunResult};
use crate::history::History;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    StageChain,
    CollapseOnly,
    EmnQuantification,
}

impl RunMode {
    pub fn name(self) -> &'static str {
        match self {
            RunMode::StageChain => "stage-chain",
            RunMode::CollapseOnly => "collapse",
            RunMode::EmnQuantification => "emn",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RunMode {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stage-chain" => Ok(RunMode::StageChain),
            "collapse" | "collapse-only" => Ok(RunMode::CollapseOnly),
            "emn" | "emn-quantification" => Ok(RunMode::EmnQuantification),
            other => Err(RunError::Usage(format!(
                "unknown mode '{}' (expected stage-chain, collapse or emn)",
                other
            ))),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A collapse pass turned `count` cells into CORE.
    Collapsed { count: usize },
    /// `max_steps` iterations without a collapse.
    StepLimit,
    /// A collapse-only pass found nothing, and nothing else moves the grid.
    Stalled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Collapsed { count } => write!(f, "collapsed ({} cells)", count),
            Termination::StepLimit => f.write_str("step limit"),
            Termination::Stalled => f.write_str("stalled"),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    /// Driver iterations executed.
    pub steps: u64,
    pub termination: Termination,
    /// Pre-step snapshots. Empty outside stage-chain runs.
    pub history: History,
    pub final_snapshot: GridSnapshot,
    pub final_hash: String,
    pub emission: Option<EmissionSummary>,
    /// PLASMA cells demoted by valignity, stage-chain runs only.
    pub demoted: Option<usize>,
    /// Mean energy per rounded distance from the center, final grid.
    pub radial_profile: BTreeMap<u64, f64>,
}

impl RunReport {
    pub fn collapsed(&self) -> bool {
        matches!(self.termination, Termination::Collapsed { .. })
    }

    /// Total energy the emission pass delivered, if one ran.
    pub fn emn_output(&self) -> Option<f64> {
        self.emission.as_ref().map(|e| e.total_emitted)
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Build the starting simulation: all-VOID grid, optional HELIUM block
/// around the center, then the explicit seeds in order.
pub fn seed_simulation(config: &RunConfig) -> RunResult<Simulation> {
    config.validate()?;
    let size = config.grid_size()?;
    let mut sim = Simulation::new(size, config.constants.clone())?
        .with_collapse_radius(config.collapse_radius);

    let grid = sim.grid_mut();
    if let Some(radius) = config.helium_seed_radius {
        let center = grid.center();
        let block: Vec<(usize, usize)> = grid.neighborhood(center, center, radius)?.collect();
        for (row, col) in block {
            grid.set_state(row, col, State::Helium)?;
        }
    }
    for seed in &config.seeds {
        grid.set_state(seed.row, seed.col, seed.state)?;
        grid.set_energy(seed.row, seed.col, seed.energy)?;
    }

    sim.check_integrity()?;
    Ok(sim)
}

/// Add `ambient / (1 + r)` to every cell, `r` the distance from the center.
pub fn inject_ambient_energy(grid: &mut Grid, ambient: f64) -> RunResult<()> {
    if ambient == 0.0 {
        return Ok(());
    }
    for (row, col) in grid.cells() {
        let r = grid.distance_from_center(row, col);
        grid.add_energy(row, col, ambient / (1.0 + r))?;
    }
    Ok(())
}

fn ensure_legal(sim: &Simulation, step: u64) -> RunResult<()> {
    if let Err(source) = sim.check_integrity() {
        error!(step, %source, "illegal state, run halted");
        return Err(RunError::IllegalState { step, source });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

struct LoopEnd {
    steps: u64,
    termination: Termination,
    emission: Option<EmissionSummary>,
    demoted: Option<usize>,
}

fn run_stage_chain(
    sim: &mut Simulation,
    config: &RunConfig,
    history: &mut History,
) -> RunResult<LoopEnd> {
    for _ in 0..config.max_steps {
        history.record(sim.steps(), sim.snapshot())?;
        inject_ambient_energy(sim.grid_mut(), config.ambient_energy)?;

        let outcome = sim.step()?;
        ensure_legal(sim, outcome.step)?;

        if outcome.collapsed > 0 {
            return Ok(LoopEnd {
                steps: outcome.step,
                termination: Termination::Collapsed {
                    count: outcome.collapsed,
                },
                emission: outcome.emission,
                demoted: outcome.demoted,
            });
        }
    }

    warn!(max_steps = config.max_steps, "no collapse within step limit");
    Ok(LoopEnd {
        steps: sim.steps(),
        termination: Termination::StepLimit,
        emission: None,
        demoted: None,
    })
}

/// A collapse pass changes the grid only when it collapses something, so
/// the first empty pass is final.
fn run_collapse_only(sim: &mut Simulation) -> RunResult<LoopEnd> {
    let count = sim.collapse_pass()?;
    ensure_legal(sim, 1)?;

    let termination = if count > 0 {
        Termination::Collapsed { count }
    } else {
        warn!("collapse pass found no qualifying cells");
        Termination::Stalled
    };
    Ok(LoopEnd {
        steps: 1,
        termination,
        emission: None,
        demoted: None,
    })
}

fn run_emn_quantification(sim: &mut Simulation) -> RunResult<LoopEnd> {
    let mut end = run_collapse_only(sim)?;
    if end.termination != Termination::Stalled {
        end.emission = Some(sim.emission_pass()?);
        ensure_legal(sim, end.steps)?;
    }
    Ok(end)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Seed a grid from `config` and drive it to termination in `mode`.
pub fn run(config: &RunConfig, mode: RunMode) -> RunResult<RunReport> {
    let mut sim = seed_simulation(config)?;
    let mut history = History::new();

    info!(
        %mode,
        grid_size = sim.grid().size(),
        max_steps = config.max_steps,
        "run starting"
    );

    let end = match mode {
        RunMode::StageChain => run_stage_chain(&mut sim, config, &mut history)?,
        RunMode::CollapseOnly => run_collapse_only(&mut sim)?,
        RunMode::EmnQuantification => run_emn_quantification(&mut sim)?,
    };

    let final_snapshot = sim.snapshot();
    let final_hash = sim.hash()?;
    let radial_profile = sim.radial_profile()?;

    info!(
        %mode,
        steps = end.steps,
        termination = %end.termination,
        hash = %final_hash,
        "run finished"
    );

    Ok(RunReport {
        mode,
        steps: end.steps,
        termination: end.termination,
        history,
        final_snapshot,
        final_hash,
        emission: end.emission,
        demoted: end.demoted,
        radial_profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedCell;

    fn quiet(size: i64) -> RunConfig {
        RunConfig {
            grid_size: size,
            helium_seed_radius: None,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_mode_names_parse_back() {
        for mode in [
            RunMode::StageChain,
            RunMode::CollapseOnly,
            RunMode::EmnQuantification,
        ] {
            assert_eq!(mode.name().parse::<RunMode>().unwrap(), mode);
        }
        assert!(matches!("warp".parse::<RunMode>(), Err(RunError::Usage(_))));
    }

    #[test]
    fn test_seeding_places_block_then_seeds() {
        let mut config = RunConfig {
            grid_size: 5,
            ..RunConfig::default()
        };
        config.seeds.push(SeedCell {
            row: 2,
            col: 2,
            state: State::Plasma,
            energy: 3.0,
        });
        let sim = seed_simulation(&config).unwrap();
        let counts = sim.grid().state_counts();
        assert_eq!(counts[&State::Helium], 8);
        assert_eq!(counts[&State::Plasma], 1);
        assert_eq!(sim.grid().get_energy(2, 2).unwrap(), 3.0);
        assert_eq!(sim.collapse_radius(), 1);
    }

    #[test]
    fn test_out_of_bounds_seed_is_rejected() {
        let mut config = quiet(3);
        config.seeds.push(SeedCell {
            row: 3,
            col: 0,
            state: State::Static,
            energy: 0.0,
        });
        assert!(matches!(
            seed_simulation(&config),
            Err(RunError::Engine(uqlt_engine::EngineError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_huge_odd_grid_size_is_rejected() {
        assert!(matches!(
            seed_simulation(&quiet(4_294_967_297)),
            Err(RunError::Engine(uqlt_engine::EngineError::GridSize { .. }))
        ));
    }

    #[test]
    fn test_ambient_input_weakens_outward() {
        let mut grid = Grid::new(5).unwrap();
        inject_ambient_energy(&mut grid, 1.0).unwrap();
        assert_eq!(grid.get_energy(2, 2).unwrap(), 1.0);
        assert_eq!(grid.get_energy(2, 3).unwrap(), 0.5);
        assert!(grid.get_energy(0, 0).unwrap() < grid.get_energy(1, 1).unwrap());
    }

    #[test]
    fn test_zero_ambient_is_a_no_op() {
        let mut grid = Grid::new(3).unwrap();
        inject_ambient_energy(&mut grid, 0.0).unwrap();
        assert_eq!(grid.total_energy(), 0.0);
    }

    #[test]
    fn test_collapse_only_without_helium_stalls() {
        let report = run(&quiet(5), RunMode::CollapseOnly).unwrap();
        assert_eq!(report.termination, Termination::Stalled);
        assert_eq!(report.steps, 1);
        assert!(report.history.is_empty());
        assert!(report.emission.is_none());
    }

    #[test]
    fn test_emn_without_collapse_emits_nothing() {
        let report = run(&quiet(5), RunMode::EmnQuantification).unwrap();
        assert_eq!(report.termination, Termination::Stalled);
        assert_eq!(report.emn_output(), None);
    }
}
