//! Run configuration — everything a driver needs besides the kernel.
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid
//! configuration; unknown fields are rejected.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use uqlt_engine::{EngineConstants, EngineError, State};

use crate::error::{RunError, RunResult};

/// Grid size used when none is configured.
pub const DEFAULT_GRID_SIZE: i64 = 11;

/// One explicitly placed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCell {
    pub row: usize,
    pub col: usize,
    pub state: State,
    #[serde(default)]
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Must be a positive odd integer.
    pub grid_size: i64,
    /// Upper bound on driver iterations.
    pub max_steps: u64,
    pub collapse_radius: usize,
    /// Energy injected per step, scaled by `1 / (1 + r)` from the center.
    pub ambient_energy: f64,
    /// Radius of the HELIUM block seeded around the center, if any.
    pub helium_seed_radius: Option<usize>,
    /// Applied after the helium block, in order.
    pub seeds: Vec<SeedCell>,
    pub constants: EngineConstants,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_steps: 500,
            collapse_radius: 1,
            ambient_energy: 0.5,
            helium_seed_radius: Some(1),
            seeds: Vec::new(),
            constants: EngineConstants::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> RunResult<Self> {
        let config: RunConfig = serde_json::from_str(json).map_err(EngineError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> RunResult<Self> {
        let data = fs::read_to_string(path).map_err(EngineError::from)?;
        Self::from_json_str(&data)
    }

    /// Grid size as an index type. Negative sizes are a grid-size error.
    pub fn grid_size(&self) -> RunResult<usize> {
        usize::try_from(self.grid_size)
            .map_err(|_| EngineError::GridSize { size: self.grid_size }.into())
    }

    pub fn validate(&self) -> RunResult<()> {
        self.constants.validate()?;
        let size = self.grid_size()?;
        if size == 0 || size % 2 == 0 {
            return Err(EngineError::GridSize { size: self.grid_size }.into());
        }
        if self.max_steps == 0 {
            return Err(RunError::Config("max_steps must be > 0".to_string()));
        }
        if !self.ambient_energy.is_finite() || self.ambient_energy < 0.0 {
            return Err(RunError::Config(format!(
                "ambient_energy must be finite and >= 0, got {}",
                self.ambient_energy
            )));
        }
        for seed in &self.seeds {
            if !seed.energy.is_finite() || seed.energy < 0.0 {
                return Err(RunError::Config(format!(
                    "seed ({}, {}) energy must be finite and >= 0, got {}",
                    seed.row, seed.col, seed.energy
                )));
            }
            if seed.state.is_void() && seed.energy != 0.0 {
                return Err(RunError::Config(format!(
                    "seed ({}, {}) is VOID and cannot carry energy",
                    seed.row, seed.col
                )));
            }
        }
        Ok(())
    }
}
