//! Error types shared by the rules engine crates.
//!
//! Expected outcomes (failed placement, no path, contested objective) are
//! typed results. Only malformed input and invariant violations abort.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{GameSize, ObjectiveKind, Side};
use crate::types::{ModelId, TerrainId};

/// Why a terrain placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PlacementError {
    #[error("footprint lies entirely outside the battlefield")]
    OutsideBounds,

    #[error("hill cannot be stacked on {existing}")]
    HillStackingViolation { existing: TerrainId },

    #[error("tree must sit on the plateau of {existing}")]
    NotOnHillPlateau { existing: TerrainId },

    #[error("structures intersect {existing}")]
    BuildingWallIntersection { existing: TerrainId },

    #[error("terrain intersects structure {existing}")]
    TerrainBuildingIntersection { existing: TerrainId },
}

impl PlacementError {
    /// Wire name of the rejection reason.
    pub fn reason(&self) -> &'static str {
        match self {
            PlacementError::OutsideBounds => "outside_bounds",
            PlacementError::HillStackingViolation { .. } => "hill_stacking_violation",
            PlacementError::NotOnHillPlateau { .. } => "not_on_hill_plateau",
            PlacementError::BuildingWallIntersection { .. } => "building_wall_intersection",
            PlacementError::TerrainBuildingIntersection { .. } => {
                "terrain_building_intersection"
            }
        }
    }
}

/// A move command could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoveError {
    #[error("no legal path for {model}")]
    NoPath { model: ModelId },

    #[error("{model} needs {required:.2} AP but has {available:.2}")]
    InsufficientAp {
        model: ModelId,
        required: f64,
        available: f64,
    },

    #[error("{model} is out of action")]
    OutOfAction { model: ModelId },
}

/// A combat command could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    #[error("{model} is out of action")]
    OutOfAction { model: ModelId },

    #[error("{attacker} and {defender} are on the same side")]
    SameSide { attacker: ModelId, defender: ModelId },

    #[error("{defender} is {distance:.2} MU from {attacker} (max {max})")]
    OutOfRange {
        attacker: ModelId,
        defender: ModelId,
        distance: f64,
        max: f64,
    },

    #[error("{attacker} cannot see {defender}")]
    NoLineOfSight { attacker: ModelId, defender: ModelId },

    #[error("{model} has no ranged weapon or is out of ammunition")]
    CannotShoot { model: ModelId },

    #[error("{model} needs {required:.2} AP but has {available:.2}")]
    InsufficientAp {
        model: ModelId,
        required: f64,
        available: f64,
    },
}

/// Mission configuration rejected before any battlefield state changes.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("invalid mission JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid battlefield size `{0}` (expected \"<W>x<H>\" square)")]
    InvalidBattlefield(String),

    #[error("{side:?} BP {bp} outside {min}..={max}")]
    BpOutOfRange { side: Side, bp: u32, min: u32, max: u32 },

    #[error("{side:?} BP {bp} does not match game size {game_size:?}")]
    BpMismatch {
        side: Side,
        bp: u32,
        game_size: GameSize,
    },

    #[error("{side:?} has {count} models (expected {min}..={max})")]
    ModelCountOutOfRange {
        side: Side,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("turn limit {0} outside 1..=20")]
    TurnLimitOutOfRange(u32),

    #[error("objective {index} must be worth at least 1 point")]
    ObjectivePoints { index: usize },

    #[error("objective {index} ({kind:?}) requires a {field}")]
    ObjectiveIncomplete {
        index: usize,
        kind: ObjectiveKind,
        field: &'static str,
    },

    #[error("objective {index} zone radius must be positive")]
    ObjectiveZone { index: usize },

    #[error("invalid model identifier `{0}`")]
    InvalidIdentifier(String),

    #[error("duplicate model identifier `{0}`")]
    DuplicateIdentifier(String),

    #[error("unknown terrain preset `{0}`")]
    UnknownPreset(String),

    #[error("terrain entry {index} rejected: {source}")]
    TerrainPlacement {
        index: usize,
        #[source]
        source: PlacementError,
    },
}

/// Top-level error for battlefield commands.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown model {0}")]
    UnknownModel(ModelId),

    #[error("unknown terrain {0}")]
    UnknownTerrain(TerrainId),

    #[error("no mission is active")]
    MissionNotActive,

    #[error("no morale test pending for {0:?}")]
    NoMoraleTestPending(Side),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Mission(#[from] MissionError),
}

pub type EngineResult<T> = Result<T, EngineError>;
