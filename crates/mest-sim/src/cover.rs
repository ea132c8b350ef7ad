//! Cover and defensive-bonus evaluation.
//!
//! A position's defensive bonus is its cover bonus against the supplied
//! enemies plus an elevation bonus when it stands strictly higher than all of
//! them. Cover classification goes through the [`CoverAnalyzer`] trait so the
//! terrain heuristic can be replaced.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use mest_core::constants::{
    COVER_PROXIMITY_MU, ELEVATION_BONUS, SAMPLE_RING_ANGLES, SAMPLE_RING_STEP_MU,
    SEGMENT_SAMPLE_MU,
};
use mest_core::enums::{CoverCategory, TerrainKind};
use mest_core::types::Position;
use mest_terrain::{Pathfinder, TerrainMap};

/// Classifies the cover a defender enjoys against one enemy.
pub trait CoverAnalyzer {
    fn cover_against(&self, map: &TerrainMap, defender: &Position, enemy: &Position) -> CoverCategory;
}

/// Terrain on the enemy line within [`COVER_PROXIMITY_MU`] of the defender:
/// structures are hard cover, trees soft, debris and hills the defender is
/// not standing on partial. The strongest piece on the line wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainCover;

impl CoverAnalyzer for TerrainCover {
    fn cover_against(&self, map: &TerrainMap, defender: &Position, enemy: &Position) -> CoverCategory {
        let distance = defender.distance_to(enemy);
        if distance <= f64::EPSILON {
            return CoverCategory::None;
        }
        let reach = distance.min(COVER_PROXIMITY_MU);
        let steps = (reach / SEGMENT_SAMPLE_MU).ceil() as usize;
        let samples: Vec<Position> = (0..=steps)
            .map(|i| defender.lerp(enemy, reach * i as f64 / steps.max(1) as f64 / distance))
            .collect();

        map.objects()
            .iter()
            .filter(|obj| samples.iter().any(|p| obj.contains(p)))
            .map(|obj| match obj.kind() {
                TerrainKind::Building | TerrainKind::Wall => CoverCategory::Hard,
                TerrainKind::TreeSingle | TerrainKind::TreeCluster | TerrainKind::TreeStand => {
                    CoverCategory::Soft
                }
                TerrainKind::Debris => CoverCategory::Partial,
                TerrainKind::Hill if obj.contains(defender) => CoverCategory::None,
                TerrainKind::Hill => CoverCategory::Partial,
            })
            .max()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefensiveBonus {
    pub total: i32,
    /// Weakest cover over all enemies.
    pub cover: CoverCategory,
    pub elevated: bool,
}

pub fn calculate_defensive_bonus(
    map: &TerrainMap,
    analyzer: &dyn CoverAnalyzer,
    position: &Position,
    enemies: &[Position],
) -> DefensiveBonus {
    let cover = enemies
        .iter()
        .map(|e| analyzer.cover_against(map, position, e))
        .min()
        .unwrap_or_default();
    let here = map.elevation_at(position);
    let elevated = !enemies.is_empty() && enemies.iter().all(|e| here > map.elevation_at(e));
    let total = cover.bonus() + if elevated { ELEVATION_BONUS } else { 0 };
    DefensiveBonus {
        total,
        cover,
        elevated,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefensivePosition {
    pub position: Position,
    pub bonus: DefensiveBonus,
    pub path_cost: f64,
    /// `bonus.total - path_cost`.
    pub score: f64,
}

/// Best reachable spot around `start` by `bonus - path cost`.
///
/// Sampling approximation: the start point first, then rings every
/// [`SAMPLE_RING_STEP_MU`] out to `2 × max_ap`, [`SAMPLE_RING_ANGLES`] points
/// per ring. Impassable samples and samples costing more than `max_ap` are
/// discarded; the first sample wins ties.
pub fn find_best_defensive_position(
    map: &TerrainMap,
    analyzer: &dyn CoverAnalyzer,
    pathfinder: &Pathfinder<'_>,
    start: &Position,
    enemies: &[Position],
    max_ap: f64,
) -> DefensivePosition {
    let start_bonus = calculate_defensive_bonus(map, analyzer, start, enemies);
    let mut best = DefensivePosition {
        position: *start,
        bonus: start_bonus,
        path_cost: 0.0,
        score: start_bonus.total as f64,
    };
    if max_ap <= 0.0 {
        return best;
    }

    let field = pathfinder.cost_field(start);
    let rings = (2.0 * max_ap / SAMPLE_RING_STEP_MU).floor() as u32;
    for ring in 1..=rings {
        let radius = ring as f64 * SAMPLE_RING_STEP_MU;
        for step in 0..SAMPLE_RING_ANGLES {
            let angle = TAU * step as f64 / SAMPLE_RING_ANGLES as f64;
            let candidate = start.offset(angle, radius);
            if !pathfinder.is_passable(&candidate) {
                continue;
            }
            let Some(cost) = pathfinder.cost_via(&field, &candidate) else {
                continue;
            };
            if cost > max_ap + 1e-9 {
                continue;
            }
            let bonus = calculate_defensive_bonus(map, analyzer, &candidate, enemies);
            let score = bonus.total as f64 - cost;
            if score > best.score {
                best = DefensivePosition {
                    position: candidate,
                    bonus,
                    path_cost: cost,
                    score,
                };
            }
        }
    }
    best
}
