//! Mission loading: validated configuration to terrain map and roster.
//!
//! Nothing here touches a live battlefield. The engine swaps in the result
//! only after every step has succeeded.

use std::f64::consts::TAU;

use tracing::{debug, warn};

use mest_ai::AiProfileKind;
use mest_core::components::ModelInfo;
use mest_core::constants::{SAMPLE_RING_ANGLES, SAMPLE_RING_STEP_MU};
use mest_core::enums::{Deployment, Side};
use mest_core::error::MissionError;
use mest_core::mission::{MissionConfig, SideConfig};
use mest_core::types::{BattlefieldSize, Position};
use mest_terrain::presets::preset_layout;
use mest_terrain::{CostTable, TerrainMap};

use crate::roster::{IdentifierPool, Roster};

/// Standard deployment line, measured in from the home edge (MU).
const STANDARD_DEPTH_MU: f64 = 4.0;
/// Reinforcements arrive on the home edge (MU in from it).
const REINFORCEMENT_DEPTH_MU: f64 = 1.0;
/// Spacing between models along the deployment line (MU).
const DEPLOY_SPACING_MU: f64 = 2.0;
/// How far to search for open ground around a blocked deployment spot (MU).
const DEPLOY_SEARCH_MU: f64 = 6.0;

pub struct LoadedMission {
    pub size: BattlefieldSize,
    pub terrain: TerrainMap,
    pub roster: Roster,
    pub ai_profiles: [AiProfileKind; 2],
    /// Preset pieces that did not fit this battlefield.
    pub skipped_terrain: usize,
}

/// Validate `config` and build everything a battlefield needs from it.
pub fn load_mission(
    config: &MissionConfig,
    strict_bp: bool,
    costs: &CostTable,
) -> Result<LoadedMission, MissionError> {
    let size = config.validate()?;
    for (side, bp) in config.bp_mismatches() {
        if strict_bp {
            return Err(MissionError::BpMismatch {
                side,
                bp,
                game_size: config.game_size,
            });
        }
        warn!(side = side.as_str(), bp, game_size = ?config.game_size, "BP outside game-size band");
    }

    let (terrain, skipped_terrain) = build_terrain(config, size)?;
    let roster = spawn_models(config, &terrain, costs);
    let ai_profiles = Side::BOTH.map(|side| ai_profile(config.side(side)));

    Ok(LoadedMission {
        size,
        terrain,
        roster,
        ai_profiles,
        skipped_terrain,
    })
}

/// Preset pieces first, then custom entries. A preset piece that no longer
/// fits is skipped; a rejected custom entry fails the load.
pub fn build_terrain(
    config: &MissionConfig,
    size: BattlefieldSize,
) -> Result<(TerrainMap, usize), MissionError> {
    let mut map = TerrainMap::new(size);
    let mut skipped = 0;
    if let Some(name) = &config.terrain.preset {
        for entry in preset_layout(name)? {
            if let Err(reason) = map.place(&entry) {
                warn!(preset = %name, kind = entry.kind.as_str(), %reason, "preset piece skipped");
                skipped += 1;
            }
        }
    }
    for (index, entry) in config.terrain.custom.iter().enumerate() {
        map.place(entry)
            .map_err(|source| MissionError::TerrainPlacement { index, source })?;
    }
    Ok((map, skipped))
}

fn ai_profile(side: &SideConfig) -> AiProfileKind {
    let Some(name) = &side.ai_profile else {
        return AiProfileKind::default();
    };
    AiProfileKind::from_name(name).unwrap_or_else(|| {
        warn!(profile = %name, "unknown AI profile, using balanced");
        AiProfileKind::default()
    })
}

/// Spawn both sides. Custom identifiers are reserved before any pool
/// letter is handed out, so letters never collide with them.
pub fn spawn_models(config: &MissionConfig, map: &TerrainMap, costs: &CostTable) -> Roster {
    let mut pool = IdentifierPool::new();
    for side in Side::BOTH {
        for model in &config.side(side).models {
            if let Some(id) = &model.identifier {
                pool.reserve(id);
            }
        }
    }

    let mut roster = Roster::new();
    for side in Side::BOTH {
        let cfg = config.side(side);
        let positions = deployment_positions(cfg, side, map, costs);
        let shares = bp_shares(cfg);
        for ((model, position), bp) in cfg.models.iter().zip(positions).zip(shares) {
            let identifier = match &model.identifier {
                Some(id) => id.clone(),
                None => pool.assign(side),
            };
            let mut profile = model.profile.clone();
            if let Some(name) = &model.name {
                profile.name = name.clone();
            }
            let mut info = ModelInfo::new(identifier, profile, bp);
            if let Some(height) = model.height {
                info.height = height;
            }
            let id = roster.spawn(side, position, info);
            debug!(model = %id, side = side.as_str(), x = position.x, y = position.y, "model deployed");
        }
    }
    roster
}

/// BP per model: explicit profile values, the rest of the side's BP split
/// evenly with any remainder going to the first models.
pub fn bp_shares(side: &SideConfig) -> Vec<u32> {
    let explicit: u32 = side.models.iter().filter_map(|m| m.profile.bp).sum();
    let implicit = side.models.iter().filter(|m| m.profile.bp.is_none()).count() as u32;
    let pool = side.bp.saturating_sub(explicit);
    let (share, mut remainder) = match implicit {
        0 => (0, 0),
        n => (pool / n, pool % n),
    };
    side.models
        .iter()
        .map(|m| {
            m.profile.bp.unwrap_or_else(|| {
                let extra = u32::from(remainder > 0);
                remainder = remainder.saturating_sub(1);
                share + extra
            })
        })
        .collect()
}

/// Starting positions in model order. Explicit model positions win;
/// otherwise models line up across the deployment line for the side's mode,
/// centered on `initialPosition` when one is given.
pub fn deployment_positions(
    cfg: &SideConfig,
    side: Side,
    map: &TerrainMap,
    costs: &CostTable,
) -> Vec<Position> {
    let size = map.size();
    let home = -side.forward_sign();
    let line_y = match cfg.deployment {
        Deployment::Infiltration => home * size.half() / 4.0,
        Deployment::Reinforcements => home * (size.half() - REINFORCEMENT_DEPTH_MU),
        Deployment::Standard | Deployment::Custom => home * (size.half() - STANDARD_DEPTH_MU),
    };
    let anchor = cfg.initial_position.unwrap_or(Position::new(0.0, line_y));

    let n = cfg.models.len();
    let spacing = DEPLOY_SPACING_MU.min((size.side - DEPLOY_SPACING_MU) / n.max(1) as f64);
    cfg.models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            if let Some(pos) = model.position {
                return pos;
            }
            let offset = (i as f64 - (n as f64 - 1.0) / 2.0) * spacing;
            let spot = size.clamp(&Position::new(anchor.x + offset, anchor.y));
            open_ground_near(map, costs, spot)
        })
        .collect()
}

/// `spot` if passable, else the nearest passable sample around it.
fn open_ground_near(map: &TerrainMap, costs: &CostTable, spot: Position) -> Position {
    if costs.cost_at(map, &spot).is_some() {
        return spot;
    }
    let rings = (DEPLOY_SEARCH_MU / SAMPLE_RING_STEP_MU) as u32;
    for ring in 1..=rings {
        let radius = ring as f64 * SAMPLE_RING_STEP_MU;
        for step in 0..SAMPLE_RING_ANGLES {
            let angle = TAU * step as f64 / SAMPLE_RING_ANGLES as f64;
            let p = spot.offset(angle, radius);
            if costs.cost_at(map, &p).is_some() {
                return p;
            }
        }
    }
    warn!(x = spot.x, y = spot.y, "no open ground near deployment spot");
    spot
}
