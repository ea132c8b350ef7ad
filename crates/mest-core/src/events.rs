//! Events emitted by the rules engine for UI and log feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ModelId, Position, TerrainId};

/// Something rules-relevant happened. Drained into each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RulesEvent {
    MissionLoaded { name: String },
    TurnStarted { turn: u32 },
    TerrainPlaced { id: TerrainId, kind: TerrainKind },
    TerrainRemoved { id: TerrainId },
    ModelMoved {
        model: ModelId,
        from: Position,
        to: Position,
        ap_cost: f64,
    },
    StatusChanged {
        model: ModelId,
        statuses: Vec<ModelStatus>,
    },
    ModelOutOfAction { model: ModelId, token: TokenKind },
    CombatResolved {
        attacker: ModelId,
        defender: ModelId,
        kind: CombatKind,
        hit: bool,
    },
    /// A side fell below half strength; an external bottle test is due.
    MoraleTestTriggered { side: Side },
    BottledOut { side: Side },
    FirstCrossing { side: Side, model: ModelId },
    AggressionBonus { side: Side },
    ObjectiveCompleted {
        objective: String,
        side: Side,
        points: u32,
    },
    EndGameDieAdded { turn: u32, dice: u32 },
    EndGameRoll { turn: u32, rolls: Vec<u8> },
    MissionEnded { turn: u32, reason: EndReason },
}
