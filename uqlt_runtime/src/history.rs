//! Run history — the per-step record a stage-chain run keeps.
//!
//! Each entry owns a deep copy of the grid taken before the step ran,
//! plus its canonical hash for later verification. Entries never share
//! storage with the live grid.

use serde::Serialize;

use uqlt_engine::hashing::canonical_hash;
use uqlt_engine::GridSnapshot;

use crate::error::RunResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Steps completed when the snapshot was taken.
    pub step: u64,
    pub snapshot: GridSnapshot,
    /// Canonical hash of `snapshot` at record time.
    pub hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot. The hash is computed here, once.
    pub fn record(&mut self, step: u64, snapshot: GridSnapshot) -> RunResult<&HistoryEntry> {
        let hash = canonical_hash(&snapshot)?;
        self.entries.push(HistoryEntry {
            step,
            snapshot,
            hash,
        });
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Entry recorded at `step`, if any.
    pub fn at_step(&self, step: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.step == step)
    }
}

/// Recompute the entry's hash and compare it to the recorded one.
pub fn verify_entry(entry: &HistoryEntry) -> RunResult<bool> {
    Ok(canonical_hash(&entry.snapshot)? == entry.hash)
}
