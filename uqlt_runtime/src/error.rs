//! Runtime error type.
//!
//! Kernel errors pass through unchanged; the runtime adds only the
//! failures that belong to driving a run.

use thiserror::Error;

use uqlt_engine::EngineError;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The driver's integrity check failed; the run is aborted.
    #[error("illegal state detected at step {step}: {source}")]
    IllegalState { step: u64, source: EngineError },

    /// Two runs of the same configuration disagreed.
    #[error("determinism failure: run 1 hash {first}, run 2 hash {second}")]
    Determinism { first: String, second: String },

    #[error("snapshot size mismatch: {left} vs {right}")]
    SnapshotSizeMismatch { left: usize, right: usize },

    #[error("invalid run config: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),
}

pub type RunResult<T> = Result<T, RunError>;
