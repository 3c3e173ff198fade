#![forbid(unsafe_code)]

//! UQLT Runtime
//!
//! Drives the engine kernel: run configuration, the stage-chain,
//! collapse-only and EMN-quantification loops, in-memory history,
//! replay, and drift detection.
//!
//! No domain rule lives here; transitions, collapse, emission and
//! valignity are all delegated to `uqlt_engine`.

pub mod error;
pub mod config;
pub mod history;
pub mod driver;
pub mod replay;
pub mod drift;

pub use config::{RunConfig, SeedCell};
pub use driver::{run, RunMode, RunReport, Termination};
pub use error::{RunError, RunResult};
