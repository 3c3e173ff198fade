#![forbid(unsafe_code)]

/// Engine v1. Part of every canonical hash; bump on any rule change.
pub const ENGINE_VERSION: u32 = 1;

pub mod error;
pub mod state;
pub mod config;
pub mod invariants;
pub mod grid;
pub mod transitions;
pub mod collapse;
pub mod emission;
pub mod valignity;
pub mod hashing;
pub mod engine;

pub use config::{EngineConstants, MaxUnitEnergy};
pub use engine::{Simulation, StepOutcome};
pub use error::{EngineError, EngineResult};
pub use grid::{Grid, GridSnapshot};
pub use state::State;
