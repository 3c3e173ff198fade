/// UQLT Engine — State Model
///
/// The closed set of legal cell states. No transition logic lives here;
/// this is the vocabulary and ordering every pass dispatches on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A cell's evolutionary stage.
///
/// Chain states are totally ordered
/// `VOID < STATIC < RADIO < RADIANT < PLASMA < HELIUM < HELIUM_FRAGMENT < HYDROGEN`.
/// `CORE` is terminal and absorbing; `HEAVY` is a residue branch. Neither is ranked.
/// The derived `Ord` is code order (map keys only); use `precedes` for stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Void,
    Static,
    Radio,
    Radiant,
    Plasma,
    Helium,
    HeliumFragment,
    Hydrogen,
    Core,
    Heavy,
}

impl State {
    /// Every member of the closed set, in code order.
    pub const ALL: [State; 10] = [
        State::Void,
        State::Static,
        State::Radio,
        State::Radiant,
        State::Plasma,
        State::Helium,
        State::HeliumFragment,
        State::Hydrogen,
        State::Core,
        State::Heavy,
    ];

    /// Saturation-driven escalation order.
    pub const STAGE_CHAIN: [State; 6] = [
        State::Void,
        State::Static,
        State::Radio,
        State::Radiant,
        State::Plasma,
        State::Helium,
    ];

    /// Stable numeric code (0..=9).
    pub fn code(self) -> u8 {
        match self {
            State::Void => 0,
            State::Static => 1,
            State::Radio => 2,
            State::Radiant => 3,
            State::Plasma => 4,
            State::Helium => 5,
            State::HeliumFragment => 6,
            State::Hydrogen => 7,
            State::Core => 8,
            State::Heavy => 9,
        }
    }

    /// Upper-case canonical name, as used in configuration and hashing.
    pub fn name(self) -> &'static str {
        match self {
            State::Void => "VOID",
            State::Static => "STATIC",
            State::Radio => "RADIO",
            State::Radiant => "RADIANT",
            State::Plasma => "PLASMA",
            State::Helium => "HELIUM",
            State::HeliumFragment => "HELIUM_FRAGMENT",
            State::Hydrogen => "HYDROGEN",
            State::Core => "CORE",
            State::Heavy => "HEAVY",
        }
    }

    /// Next state in the stage chain. `None` for HELIUM and every state off the chain.
    pub fn successor(self) -> Option<State> {
        match self {
            State::Void => Some(State::Static),
            State::Static => Some(State::Radio),
            State::Radio => Some(State::Radiant),
            State::Radiant => Some(State::Plasma),
            State::Plasma => Some(State::Helium),
            State::Helium
            | State::HeliumFragment
            | State::Hydrogen
            | State::Core
            | State::Heavy => None,
        }
    }

    /// Position in the total evolutionary order. CORE and HEAVY are unranked.
    pub fn stage_rank(self) -> Option<u8> {
        match self {
            State::Void => Some(0),
            State::Static => Some(1),
            State::Radio => Some(2),
            State::Radiant => Some(3),
            State::Plasma => Some(4),
            State::Helium => Some(5),
            State::HeliumFragment => Some(6),
            State::Hydrogen => Some(7),
            State::Core | State::Heavy => None,
        }
    }

    /// True if both states are ranked and `self` comes strictly earlier.
    pub fn precedes(self, other: State) -> bool {
        match (self.stage_rank(), other.stage_rank()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Helium-derived states, counted for collapse dominance.
    pub fn is_helium_family(self) -> bool {
        matches!(self, State::Helium | State::HeliumFragment)
    }

    pub fn is_core(self) -> bool {
        self == State::Core
    }

    pub fn is_void(self) -> bool {
        self == State::Void
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for State {
    type Error = EngineError;

    fn try_from(code: u8) -> EngineResult<Self> {
        State::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .ok_or_else(|| EngineError::InvalidState {
                value: code.to_string(),
            })
    }
}

impl FromStr for State {
    type Err = EngineError;

    fn from_str(name: &str) -> EngineResult<Self> {
        State::ALL
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| EngineError::InvalidState {
                value: name.to_string(),
            })
    }
}

/// Enforce closed-set membership for a raw state code.
pub fn validate(code: u8) -> EngineResult<State> {
    State::try_from(code)
}
