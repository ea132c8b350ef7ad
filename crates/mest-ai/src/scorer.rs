//! Heuristic action scorer.
//!
//! Pure functions over plain data: the battlefield is reached only through
//! the [`TacticalView`] trait, which the sim crate implements. Every candidate
//! scores `heuristic - 2 × AP cost` and the first maximum wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use mest_core::constants::{AI_VISIBLE_RANGE_MU, MELEE_RANGE_MU, RANGED_RANGE_MU};
use mest_core::enums::{CombatKind, Side};
use mest_core::types::{ModelId, Position};

use crate::profiles::AiProfile;

/// AP charged per action kind.
pub const MOVE_AP: f64 = 1.0;
pub const CLOSE_COMBAT_AP: f64 = 1.0;
pub const RANGED_COMBAT_AP: f64 = 1.0;
pub const HIDE_AP: f64 = 1.0;
pub const WAIT_AP: f64 = 0.0;

/// Score penalty per AP spent.
pub const AP_PENALTY: f64 = 2.0;

/// What the scorer knows about one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitView {
    pub id: ModelId,
    pub side: Side,
    pub position: Position,
    pub available_ap: f64,
    /// Carries a ranged weapon with ammunition left.
    pub can_shoot: bool,
    pub hidden: bool,
}

/// Battlefield queries the scorer needs. Implementations must not mutate
/// state; combat estimates are simulations only.
pub trait TacticalView {
    fn has_line_of_sight(&self, from: ModelId, to: ModelId) -> bool;

    /// Probability in `[0, 1]` that `attacker` hits `defender`.
    fn hit_chance(&self, attacker: ModelId, defender: ModelId, kind: CombatKind) -> f64;

    /// Defensive bonus at `at` against enemies at the given positions.
    fn defensive_bonus(&self, at: &Position, enemies: &[Position]) -> i32;

    /// Best nearby defensive spot reachable within `max_ap`.
    fn best_defensive_position(&self, start: &Position, enemies: &[Position], max_ap: f64) -> Position;

    /// Nearest point toward `target` reachable within `max_ap`.
    fn closest_reachable_point(&self, start: &Position, target: &Position, max_ap: f64) -> Position;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Move { target: Position },
    CloseCombat { target: ModelId },
    RangedCombat { target: ModelId },
    Hide,
    Wait,
}

impl ActionKind {
    pub fn ap_cost(&self) -> f64 {
        match self {
            ActionKind::Move { .. } => MOVE_AP,
            ActionKind::CloseCombat { .. } => CLOSE_COMBAT_AP,
            ActionKind::RangedCombat { .. } => RANGED_COMBAT_AP,
            ActionKind::Hide => HIDE_AP,
            ActionKind::Wait => WAIT_AP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionCandidate {
    pub action: ActionKind,
    pub heuristic: f64,
    pub score: f64,
}

impl ActionCandidate {
    fn new(action: ActionKind, heuristic: f64) -> Self {
        Self {
            action,
            heuristic,
            score: heuristic - AP_PENALTY * action.ap_cost(),
        }
    }
}

/// Enemies the actor is considered able to see.
fn visible_enemies<'e>(
    actor: &UnitView,
    enemies: &'e [UnitView],
    view: &dyn TacticalView,
) -> Vec<&'e UnitView> {
    enemies
        .iter()
        .filter(|e| {
            actor.position.distance_to(&e.position) <= AI_VISIBLE_RANGE_MU
                || view.has_line_of_sight(actor.id, e.id)
        })
        .collect()
}

/// Every affordable candidate, in a fixed order: attacks per visible enemy,
/// then moves, hide, wait.
pub fn enumerate_actions(
    actor: &UnitView,
    enemies: &[UnitView],
    view: &dyn TacticalView,
    profile: &AiProfile,
) -> Vec<ActionCandidate> {
    let affordable = |kind: &ActionKind| actor.available_ap >= kind.ap_cost();
    let visible = visible_enemies(actor, enemies, view);
    let enemy_positions: Vec<Position> = enemies.iter().map(|e| e.position).collect();
    let mut out = Vec::new();

    for enemy in &visible {
        let distance = actor.position.distance_to(&enemy.position);
        let close = ActionKind::CloseCombat { target: enemy.id };
        if distance <= MELEE_RANGE_MU && affordable(&close) {
            let p = view.hit_chance(actor.id, enemy.id, CombatKind::Close);
            out.push(ActionCandidate::new(close, profile.attack_weight * p));
        }
        let ranged = ActionKind::RangedCombat { target: enemy.id };
        if actor.can_shoot && distance <= RANGED_RANGE_MU && affordable(&ranged) {
            let p = view.hit_chance(actor.id, enemy.id, CombatKind::Ranged);
            out.push(ActionCandidate::new(
                ranged,
                profile.attack_weight * profile.ranged_factor * p,
            ));
        }
    }

    if actor.available_ap >= MOVE_AP && !enemies.is_empty() {
        let here_bonus = view.defensive_bonus(&actor.position, &enemy_positions);
        let nearest = enemies
            .iter()
            .map(|e| e.position)
            .min_by(|a, b| {
                actor
                    .position
                    .distance_to(a)
                    .total_cmp(&actor.position.distance_to(b))
            });
        if let Some(goal) = nearest {
            let target = view.closest_reachable_point(&actor.position, &goal, actor.available_ap);
            let closed = actor.position.distance_to(&goal) - target.distance_to(&goal);
            if closed > 0.0 {
                let bonus = view.defensive_bonus(&target, &enemy_positions);
                let heuristic = profile.advance_weight * closed
                    + profile.cover_weight * (bonus - here_bonus) as f64;
                out.push(ActionCandidate::new(ActionKind::Move { target }, heuristic));
            }
        }
        let shelter =
            view.best_defensive_position(&actor.position, &enemy_positions, actor.available_ap);
        if shelter != actor.position {
            let gain = view.defensive_bonus(&shelter, &enemy_positions) - here_bonus;
            if gain > 0 {
                out.push(ActionCandidate::new(
                    ActionKind::Move { target: shelter },
                    profile.cover_weight * gain as f64,
                ));
            }
        }
    }

    if !actor.hidden && !visible.is_empty() && affordable(&ActionKind::Hide) {
        let bonus = view.defensive_bonus(&actor.position, &enemy_positions);
        out.push(ActionCandidate::new(
            ActionKind::Hide,
            profile.hide_weight * (1 + bonus.max(0)) as f64,
        ));
    }

    out.push(ActionCandidate::new(ActionKind::Wait, profile.wait_weight));
    out
}

/// Highest-scoring candidate; the first one wins ties.
pub fn decide_action(
    actor: &UnitView,
    enemies: &[UnitView],
    view: &dyn TacticalView,
    profile: &AiProfile,
) -> ActionCandidate {
    let best = enumerate_actions(actor, enemies, view, profile)
        .into_iter()
        .reduce(|best, c| if c.score > best.score { c } else { best })
        .unwrap_or_else(|| ActionCandidate::new(ActionKind::Wait, profile.wait_weight));
    debug!(model = %actor.id, action = ?best.action, score = best.score, "ai decision");
    best
}
