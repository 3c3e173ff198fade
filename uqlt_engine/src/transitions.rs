/// UQLT Engine — Lawful Transitions
///
/// Per-cell state evolution. Four rule families, evaluated in a fixed
/// order, each against the output of the one before it:
///
///   1. heavy residue       RADIANT | PLASMA, energy >= 0.90 * MAX[PLASMA]  -> HEAVY
///   2. stage escalation    chain state,      energy >= MAX[state]          -> successor
///   3. helium splitting    HELIUM,           energy >= MAX[HELIUM]         -> HELIUM_FRAGMENT
///   4. fragmentation       HELIUM_FRAGMENT,  energy <= MAX[HYDROGEN]       -> HYDROGEN
///
/// Residue formation runs first so saturated RADIANT/PLASMA cells are
/// diverted before they can escalate.

use tracing::{debug, trace};

use crate::config::EngineConstants;
use crate::error::EngineResult;
use crate::grid::Grid;
use crate::state::State;

/// Fraction of MAX[PLASMA] at which RADIANT and PLASMA form heavy residue.
pub const HEAVY_RESIDUE_FRACTION: f64 = 0.90;

/// The four rule families, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    HeavyResidue,
    StageEscalation,
    HeliumSplit,
    TerminalFragmentation,
}

impl Rule {
    pub const ORDER: [Rule; 4] = [
        Rule::HeavyResidue,
        Rule::StageEscalation,
        Rule::HeliumSplit,
        Rule::TerminalFragmentation,
    ];

    /// Result of this rule for `(state, energy)`, or `None` if its
    /// precondition does not hold.
    fn apply(self, state: State, energy: f64, c: &EngineConstants) -> Option<State> {
        match self {
            Rule::HeavyResidue => {
                let residue_at = HEAVY_RESIDUE_FRACTION * c.max_energy(State::Plasma);
                match state {
                    State::Radiant | State::Plasma if energy >= residue_at => Some(State::Heavy),
                    _ => None,
                }
            }
            Rule::StageEscalation => match state.successor() {
                Some(next) if energy >= c.max_energy(state) => Some(next),
                _ => None,
            },
            Rule::HeliumSplit => match state {
                State::Helium if energy >= c.max_energy(State::Helium) => {
                    Some(State::HeliumFragment)
                }
                _ => None,
            },
            Rule::TerminalFragmentation => match state {
                State::HeliumFragment if energy <= c.max_energy(State::Hydrogen) => {
                    Some(State::Hydrogen)
                }
                _ => None,
            },
        }
    }
}

/// What one evaluation did to one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub from: State,
    pub to: State,
    /// Rules that fired, in evaluation order.
    pub fired: Vec<Rule>,
}

impl TransitionOutcome {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Evaluate all four rules for one cell. Pure.
pub fn evaluate(state: State, energy: f64, constants: &EngineConstants) -> TransitionOutcome {
    let mut current = state;
    let mut fired = Vec::new();
    for rule in Rule::ORDER {
        if let Some(next) = rule.apply(current, energy, constants) {
            current = next;
            fired.push(rule);
        }
    }
    TransitionOutcome {
        from: state,
        to: current,
        fired,
    }
}

/// Resulting state for one cell. Pure.
pub fn next_state(state: State, energy: f64, constants: &EngineConstants) -> State {
    evaluate(state, energy, constants).to
}

/// Counters for one full transition pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionSummary {
    pub evaluated: usize,
    pub changed: usize,
    pub heavy_residue: usize,
    pub stage_escalation: usize,
    pub helium_split: usize,
    pub terminal_fragmentation: usize,
}

impl TransitionSummary {
    fn record(&mut self, outcome: &TransitionOutcome) {
        self.evaluated += 1;
        if outcome.changed() {
            self.changed += 1;
        }
        for rule in &outcome.fired {
            match rule {
                Rule::HeavyResidue => self.heavy_residue += 1,
                Rule::StageEscalation => self.stage_escalation += 1,
                Rule::HeliumSplit => self.helium_split += 1,
                Rule::TerminalFragmentation => self.terminal_fragmentation += 1,
            }
        }
    }
}

/// Apply `evaluate` to every cell and write changed states back.
///
/// Outcomes depend only on each cell's own pre-pass (state, energy).
pub fn advance_grid(grid: &mut Grid, constants: &EngineConstants) -> EngineResult<TransitionSummary> {
    let mut summary = TransitionSummary::default();
    let mut updates: Vec<(usize, usize, State)> = Vec::new();

    for (row, col) in grid.cells() {
        let state = grid.get_state(row, col)?;
        let energy = grid.get_energy(row, col)?;
        let outcome = evaluate(state, energy, constants);
        summary.record(&outcome);
        if outcome.changed() {
            trace!(row, col, from = %outcome.from, to = %outcome.to, "cell transition");
            updates.push((row, col, outcome.to));
        }
    }

    for (row, col, state) in updates {
        grid.set_state(row, col, state)?;
    }

    debug!(
        changed = summary.changed,
        heavy = summary.heavy_residue,
        escalated = summary.stage_escalation,
        split = summary.helium_split,
        fragmented = summary.terminal_fragmentation,
        "transition pass"
    );
    Ok(summary)
}
