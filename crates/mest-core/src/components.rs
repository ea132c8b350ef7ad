//! ECS components for model entities.
//!
//! Components are plain data structs with no rules logic.
//! Rules live in the sim crate's subsystems, not components.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ABILITY, DEFAULT_MODEL_HEIGHT, DEFAULT_WOUNDS_TO_KO};
use crate::enums::ModelStatus;

/// Stats and cost of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelProfile {
    pub name: String,
    /// Close combat ability.
    pub cca: i32,
    /// Ranged combat ability.
    pub rca: i32,
    /// Reflexes; added to the defender's roll.
    pub reflexes: i32,
    /// Wounds at which the model is knocked out.
    pub wounds_to_ko: u32,
    /// Build-point value; `None` means an even share of the side's BP.
    pub bp: Option<u32>,
    /// Whether the model carries a ranged weapon.
    pub ranged: bool,
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self {
            name: "Trooper".into(),
            cca: DEFAULT_ABILITY,
            rca: DEFAULT_ABILITY,
            reflexes: DEFAULT_ABILITY,
            wounds_to_ko: DEFAULT_WOUNDS_TO_KO,
            bp: None,
            ranged: true,
        }
    }
}

/// Identity and physical data of a model on the battlefield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Display identifier (pool letter or validated custom string).
    pub identifier: String,
    /// Height in MU.
    pub height: f64,
    pub profile: ModelProfile,
    /// Resolved BP value.
    pub bp: u32,
}

impl ModelInfo {
    pub fn new(identifier: impl Into<String>, profile: ModelProfile, bp: u32) -> Self {
        Self {
            identifier: identifier.into(),
            height: DEFAULT_MODEL_HEIGHT,
            profile,
            bp,
        }
    }
}

/// Per-turn action bookkeeping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionState {
    /// AP spent this turn.
    pub ap_spent: f64,
}

/// Derived status labels, recomputed on every hindrance mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statuses(pub Vec<ModelStatus>);
