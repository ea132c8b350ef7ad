//! Read snapshots handed to rendering and UI layers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::RulesEvent;
use crate::types::{BattlefieldSize, ModelId, Position, TerrainId};

/// Complete visible state of a battlefield session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattlefieldSnapshot {
    pub turn: u32,
    pub phase: MissionPhase,
    pub battlefield: Option<BattlefieldSize>,
    pub terrain: Vec<TerrainView>,
    pub models: Vec<ModelView>,
    pub objectives: Vec<ObjectiveView>,
    pub score: ScoreView,
    pub events: Vec<RulesEvent>,
}

/// A terrain piece as the renderer needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainView {
    pub id: TerrainId,
    pub kind: TerrainKind,
    pub position: Position,
    pub rotation_deg: f64,
    /// Collision footprint radius (MU).
    pub footprint_radius: f64,
    /// Rectangular extent for structures, `None` for circular pieces.
    pub extent: Option<(f64, f64)>,
    pub height: f64,
    pub blocking: bool,
    /// Hill plateau radius and elevation.
    pub plateau: Option<(f64, f64)>,
}

/// A model as the renderer and UI need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelView {
    pub id: ModelId,
    pub side: Side,
    pub identifier: String,
    pub position: Position,
    pub height: f64,
    pub ap_spent: f64,
    pub available_ap: f64,
    pub statuses: Vec<ModelStatus>,
    pub tokens: Vec<(TokenKind, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveView {
    pub id: String,
    pub kind: ObjectiveKind,
    pub side: Side,
    pub points: u32,
    pub completed: bool,
    /// Consecutive turn-ends controlled (control objectives only).
    pub control_streak: u32,
}

/// Running per-side score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideScore {
    pub vp: u32,
    pub rp: u32,
    pub eliminated_bp: u32,
    pub bottled_out: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub side_a: SideScore,
    pub side_b: SideScore,
}

/// Per-side victory-point breakdown at mission end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpBreakdown {
    /// VP accrued during play (outnumbering, aggression, objectives).
    pub accrued: u32,
    pub bottled_out_bonus: u32,
    pub elimination: u32,
    pub resource: u32,
}

impl VpBreakdown {
    pub fn total(&self) -> u32 {
        self.accrued + self.bottled_out_bonus + self.elimination + self.resource
    }
}

/// Final scoring of a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionResult {
    /// `None` is a draw.
    pub winner: Option<Side>,
    pub side_a: VpBreakdown,
    pub side_b: VpBreakdown,
    pub rp: (u32, u32),
    pub turn: u32,
    pub reason: Option<EndReason>,
}

impl MissionResult {
    pub fn breakdown(&self, side: Side) -> &VpBreakdown {
        match side {
            Side::SideA => &self.side_a,
            Side::SideB => &self.side_b,
        }
    }
}
