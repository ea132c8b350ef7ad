//! Mission configuration wire format and validation.
//!
//! The JSON shape is consumed verbatim (camelCase keys). `validate` enforces
//! every numeric bound before the battlefield is touched.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::components::ModelProfile;
use crate::constants::*;
use crate::enums::{Deployment, GameSize, HillSize, ObjectiveKind, Side, TerrainKind};
use crate::error::MissionError;
use crate::types::{BattlefieldSize, Position};

impl GameSize {
    /// Canonical end-game trigger turn.
    pub fn trigger_turn(self) -> u32 {
        match self {
            GameSize::Small => 4,
            GameSize::Medium => 6,
            GameSize::Large => 8,
        }
    }

    /// BP band a side is expected to field at this size.
    pub fn bp_band(self) -> RangeInclusive<u32> {
        match self {
            GameSize::Small => 500..=650,
            GameSize::Medium => 651..=850,
            GameSize::Large => 851..=1000,
        }
    }
}

/// Complete mission description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub game_size: GameSize,
    /// `"<W>x<H>"` in MU; must be square.
    pub battlefield: String,
    pub side_a: SideConfig,
    pub side_b: SideConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub objectives: Vec<ObjectiveConfig>,
    #[serde(default)]
    pub victory_conditions: VictoryConditions,
    #[serde(default)]
    pub special_rules: SpecialRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideConfig {
    pub name: String,
    pub bp: u32,
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub deployment: Deployment,
    #[serde(default)]
    pub initial_position: Option<Position>,
    #[serde(default)]
    pub ai: bool,
    #[serde(default)]
    pub ai_profile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: ModelProfile,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainConfig {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub custom: Vec<TerrainEntry>,
}

/// One custom terrain piece. Unused fields are ignored per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainEntry {
    #[serde(rename = "type")]
    pub kind: TerrainKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub size: Option<HillSize>,
    #[serde(default, rename = "plateauRadiusMU")]
    pub plateau_radius_mu: Option<f64>,
    #[serde(default, rename = "totalRadiusMU")]
    pub total_radius_mu: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
}

impl TerrainEntry {
    pub fn new(kind: TerrainKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            rotation: None,
            size: None,
            plateau_radius_mu: None,
            total_radius_mu: None,
            width: None,
            depth: None,
            height: None,
            radius: None,
        }
    }

    pub fn with_size(mut self, size: HillSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Zone {
    pub fn center(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.center().distance_to(pos) <= self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveConfig {
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub location: Option<Zone>,
    #[serde(default)]
    pub duration: Option<u32>,
    pub points: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub side: Option<Side>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictoryConditions {
    #[serde(default)]
    pub side_a: SideVictory,
    #[serde(default)]
    pub side_b: SideVictory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideVictory {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub minimum_points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRules {
    #[serde(default)]
    pub turn_limit: Option<u32>,
    #[serde(default)]
    pub reinforcement_turns: Vec<u32>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub custom_rules: Vec<String>,
}

/// Parse a `"<W>x<H>"` battlefield string. Only squares up to
/// [`BATTLEFIELD_MAX_MU`] a side are accepted.
pub fn parse_battlefield(spec: &str) -> Result<BattlefieldSize, MissionError> {
    let invalid = || MissionError::InvalidBattlefield(spec.to_string());
    let (w, h) = spec
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let w: f64 = w.trim().parse().map_err(|_| invalid())?;
    let h: f64 = h.trim().parse().map_err(|_| invalid())?;
    if !(w.is_finite() && w > 0.0 && w <= BATTLEFIELD_MAX_MU) || w != h {
        return Err(invalid());
    }
    Ok(BattlefieldSize::new(w))
}

/// Custom identifiers: 1..=12 ASCII alphanumerics.
pub fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier.len() <= CUSTOM_IDENTIFIER_MAX_LEN
        && identifier.chars().all(|c| c.is_ascii_alphanumeric())
}

impl MissionConfig {
    pub fn from_json(json: &str) -> Result<Self, MissionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn side(&self, side: Side) -> &SideConfig {
        match side {
            Side::SideA => &self.side_a,
            Side::SideB => &self.side_b,
        }
    }

    /// Enforce every schema bound. Returns the parsed battlefield size.
    ///
    /// BP-versus-game-size mismatches are not checked here; see
    /// [`MissionConfig::bp_mismatches`].
    pub fn validate(&self) -> Result<BattlefieldSize, MissionError> {
        if self.name.trim().is_empty() {
            return Err(MissionError::MissingField("name"));
        }
        let size = parse_battlefield(&self.battlefield)?;

        let mut seen = HashSet::new();
        for side in Side::BOTH {
            let cfg = self.side(side);
            if cfg.name.trim().is_empty() {
                return Err(MissionError::MissingField("side name"));
            }
            if !(BP_MIN..=BP_MAX).contains(&cfg.bp) {
                return Err(MissionError::BpOutOfRange {
                    side,
                    bp: cfg.bp,
                    min: BP_MIN,
                    max: BP_MAX,
                });
            }
            let count = cfg.models.len();
            if !(MODELS_PER_SIDE_MIN..=MODELS_PER_SIDE_MAX).contains(&count) {
                return Err(MissionError::ModelCountOutOfRange {
                    side,
                    count,
                    min: MODELS_PER_SIDE_MIN,
                    max: MODELS_PER_SIDE_MAX,
                });
            }
            for model in &cfg.models {
                if let Some(id) = &model.identifier {
                    if !is_valid_identifier(id) {
                        return Err(MissionError::InvalidIdentifier(id.clone()));
                    }
                    if !seen.insert(id.clone()) {
                        return Err(MissionError::DuplicateIdentifier(id.clone()));
                    }
                }
            }
        }

        if let Some(limit) = self.special_rules.turn_limit {
            if !(TURN_LIMIT_MIN..=TURN_LIMIT_MAX).contains(&limit) {
                return Err(MissionError::TurnLimitOutOfRange(limit));
            }
        }

        for (index, obj) in self.objectives.iter().enumerate() {
            self.validate_objective(index, obj)?;
        }

        Ok(size)
    }

    fn validate_objective(&self, index: usize, obj: &ObjectiveConfig) -> Result<(), MissionError> {
        if obj.points < 1 {
            return Err(MissionError::ObjectivePoints { index });
        }
        if let Some(zone) = &obj.location {
            if !(zone.radius.is_finite() && zone.radius > 0.0) {
                return Err(MissionError::ObjectiveZone { index });
            }
        }
        let incomplete = |field| MissionError::ObjectiveIncomplete {
            index,
            kind: obj.kind,
            field,
        };
        let needs_target = matches!(
            obj.kind,
            ObjectiveKind::Eliminate
                | ObjectiveKind::Destroy
                | ObjectiveKind::Escort
                | ObjectiveKind::Intercept
        );
        let needs_zone = matches!(
            obj.kind,
            ObjectiveKind::Control | ObjectiveKind::Capture | ObjectiveKind::Escort
        );
        if needs_target && obj.target.is_none() {
            return Err(incomplete("target"));
        }
        if needs_zone && obj.location.is_none() {
            return Err(incomplete("location"));
        }
        if obj.kind == ObjectiveKind::Survive && obj.duration.is_none() {
            return Err(incomplete("duration"));
        }
        Ok(())
    }

    /// Sides whose BP falls outside the band expected for the game size.
    pub fn bp_mismatches(&self) -> Vec<(Side, u32)> {
        let band = self.game_size.bp_band();
        Side::BOTH
            .into_iter()
            .map(|side| (side, self.side(side).bp))
            .filter(|(_, bp)| !band.contains(bp))
            .collect()
    }
}
