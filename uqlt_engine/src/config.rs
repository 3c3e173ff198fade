/// UQLT Engine — Process Constants
///
/// One immutable value per run, handed to every pass. Keys keep the
/// historical constant names so existing parameter files load unchanged.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::state::State;

/// Saturation threshold per state. Every state must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaxUnitEnergy {
    #[serde(rename = "VOID")]
    pub void: f64,
    #[serde(rename = "STATIC")]
    pub static_: f64,
    #[serde(rename = "RADIO")]
    pub radio: f64,
    #[serde(rename = "RADIANT")]
    pub radiant: f64,
    #[serde(rename = "PLASMA")]
    pub plasma: f64,
    #[serde(rename = "HELIUM")]
    pub helium: f64,
    #[serde(rename = "HELIUM_FRAGMENT")]
    pub helium_fragment: f64,
    #[serde(rename = "HYDROGEN")]
    pub hydrogen: f64,
    #[serde(rename = "CORE")]
    pub core: f64,
    #[serde(rename = "HEAVY")]
    pub heavy: f64,
}

impl MaxUnitEnergy {
    pub fn get(&self, state: State) -> f64 {
        match state {
            State::Void => self.void,
            State::Static => self.static_,
            State::Radio => self.radio,
            State::Radiant => self.radiant,
            State::Plasma => self.plasma,
            State::Helium => self.helium,
            State::HeliumFragment => self.helium_fragment,
            State::Hydrogen => self.hydrogen,
            State::Core => self.core,
            State::Heavy => self.heavy,
        }
    }
}

impl Default for MaxUnitEnergy {
    fn default() -> Self {
        Self {
            void: 1.0,
            static_: 2.0,
            radio: 4.0,
            radiant: 8.0,
            plasma: 16.0,
            helium: 32.0,
            helium_fragment: 24.0,
            hydrogen: 12.0,
            core: 100.0,
            heavy: 64.0,
        }
    }
}

/// All constants consumed by the kernel passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EngineConstants {
    /// Numerator of the inverse-distance emission law.
    pub core_emission_rate: f64,
    /// Per-pair emission cap.
    pub c_squared_max_motion: f64,
    /// Local helium fraction at or above which a cell collapses.
    pub collapse_helium_threshold: f64,
    pub max_unit_energy: MaxUnitEnergy,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            core_emission_rate: 4.0,
            c_squared_max_motion: 2.0,
            collapse_helium_threshold: 0.5,
            max_unit_energy: MaxUnitEnergy::default(),
        }
    }
}

impl EngineConstants {
    /// Parse and validate constants from a JSON document.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let constants: EngineConstants = serde_json::from_str(json)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Saturation threshold for `state`.
    pub fn max_energy(&self, state: State) -> f64 {
        self.max_unit_energy.get(state)
    }

    /// Reject values no pass can operate on.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.core_emission_rate.is_finite() || self.core_emission_rate < 0.0 {
            return Err(EngineError::InvalidConstant {
                name: "CORE_EMISSION_RATE",
                reason: format!("must be finite and >= 0, got {}", self.core_emission_rate),
            });
        }
        if !self.c_squared_max_motion.is_finite() || self.c_squared_max_motion <= 0.0 {
            return Err(EngineError::InvalidConstant {
                name: "C_SQUARED_MAX_MOTION",
                reason: format!("must be finite and > 0, got {}", self.c_squared_max_motion),
            });
        }
        let t = self.collapse_helium_threshold;
        if !t.is_finite() || t <= 0.0 || t > 1.0 {
            return Err(EngineError::InvalidConstant {
                name: "COLLAPSE_HELIUM_THRESHOLD",
                reason: format!("must lie in (0, 1], got {}", t),
            });
        }
        for state in State::ALL {
            let max = self.max_energy(state);
            if !max.is_finite() || max < 0.0 {
                return Err(EngineError::InvalidConstant {
                    name: "MAX_UNIT_ENERGY",
                    reason: format!("{} must be finite and >= 0, got {}", state, max),
                });
            }
        }
        Ok(())
    }
}
