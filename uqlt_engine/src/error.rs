/// UQLT Engine — Error Taxonomy
///
/// Every variant is fatal to the run that raised it. Nothing is retried
/// and nothing is downgraded; a collapse pass that collapses zero cells
/// is an ordinary return value, not an error.

use thiserror::Error;

/// All kernel failures.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A state value outside the closed enumeration.
    #[error("invalid state: {value:?} is not a member of the state set")]
    InvalidState { value: String },

    /// An energy mutation would leave a cell below zero.
    #[error("negative energy at ({row}, {col}): {energy}")]
    NegativeEnergy { row: usize, col: usize, energy: f64 },

    /// An energy mutation produced NaN or an infinity.
    #[error("non-finite energy at ({row}, {col})")]
    NonFiniteEnergy { row: usize, col: usize },

    /// Grid size must be a positive odd integer.
    #[error("grid size must be a positive odd integer, got {size}")]
    GridSize { size: i64 },

    #[error("cell ({row}, {col}) is outside the {size}x{size} grid")]
    OutOfBounds { row: usize, col: usize, size: usize },

    /// A configuration constant failed validation.
    #[error("invalid constant {name}: {reason}")]
    InvalidConstant { name: &'static str, reason: String },

    /// The grid failed its integrity check.
    #[error("illegal grid: {0}")]
    IllegalGrid(String),

    /// A snapshot's arrays do not match its declared size.
    #[error("snapshot shape mismatch: size {size} needs {expected} cells, got {states} states and {energy} energies")]
    SnapshotShape {
        size: usize,
        expected: usize,
        states: usize,
        energy: usize,
    },

    /// The run already collapsed; no further steps are lawful.
    #[error("simulation run already finished")]
    RunFinished,

    /// Valignity is applied exactly once per run.
    #[error("valignity has already been applied in this run")]
    ValignityAlreadyApplied,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
