//! Commands issued by presentation layers to the battlefield.
//!
//! Every command is applied synchronously by `Battlefield::execute`.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::mission::{MissionConfig, TerrainEntry};
use crate::types::{ModelId, Position, TerrainId};

/// All state-mutating operations on a battlefield session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    // --- Mission lifecycle ---
    /// Replace the whole battlefield with a validated mission.
    LoadMission { mission: Box<MissionConfig> },
    /// Begin the next turn: reset AP, purge turn-scoped tokens.
    StartNewTurn,
    /// Run end-of-turn morale, objective, aggression and end-game checks.
    ProcessEndOfTurn,
    /// Evaluate objectives and award newly completed ones.
    CheckObjectives,

    // --- Terrain ---
    PlaceTerrain { entry: TerrainEntry },
    RemoveTerrain { id: TerrainId },
    ClearTerrain,

    // --- Models ---
    MoveModel { model: ModelId, target: Position },
    AddToken {
        model: ModelId,
        token: TokenKind,
        #[serde(default)]
        count: Option<u32>,
    },
    RemoveToken { model: ModelId, token: TokenKind },
    AddHindrance { model: ModelId, kind: HindranceKind },
    RemoveHindrance { model: ModelId, kind: HindranceKind },
    ClearTokens { model: ModelId },

    // --- Resolution ---
    ResolveCombat {
        attacker: ModelId,
        defender: ModelId,
        kind: CombatKind,
    },
    /// Outcome of a bottle/morale test rolled by an external collaborator.
    ResolveMoraleTest { side: Side, passed: bool },
}
