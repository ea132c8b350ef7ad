//! Mission objective tracking.
//!
//! Objectives are identified as `objective-<index>` in mission order. A
//! completed objective is never evaluated again, so its points are awarded
//! exactly once.

use std::collections::BTreeSet;

use mest_core::constants::MELEE_RANGE_MU;
use mest_core::enums::{ObjectiveKind, Side};
use mest_core::mission::ObjectiveConfig;
use mest_core::state::ObjectiveView;
use mest_core::types::{ModelId, Position};

/// What the tracker needs to know about one model.
#[derive(Debug, Clone)]
pub struct ModelState {
    pub id: ModelId,
    pub side: Side,
    pub identifier: String,
    pub position: Position,
    pub ko: bool,
    pub eliminated: bool,
}

impl ModelState {
    pub fn is_active(&self) -> bool {
        !self.ko && !self.eliminated
    }
}

#[derive(Debug, Clone)]
pub struct Objective {
    pub id: String,
    pub config: ObjectiveConfig,
    /// Owning side; `side-a` when the mission leaves it open.
    pub side: Side,
    /// Consecutive turn-ends controlled (control objectives).
    pub control_streak: u32,
}

/// An objective completed by the latest check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub objective: String,
    pub side: Side,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveReport {
    pub completed: Vec<String>,
    pub active: Vec<String>,
    /// Newly completed this check; empty on a repeat check.
    pub awarded: Vec<Award>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectiveTracker {
    objectives: Vec<Objective>,
    completed: BTreeSet<String>,
}

impl ObjectiveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the objective list and forget all completions.
    pub fn set_objectives(&mut self, configs: &[ObjectiveConfig]) {
        self.objectives = configs
            .iter()
            .enumerate()
            .map(|(index, config)| Objective {
                id: format!("objective-{index}"),
                config: config.clone(),
                side: config.side.unwrap_or(Side::SideA),
                control_streak: 0,
            })
            .collect();
        self.completed.clear();
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Turn-end bookkeeping: extend or reset control streaks.
    pub fn end_of_turn(&mut self, models: &[ModelState]) {
        for obj in &mut self.objectives {
            if obj.config.kind != ObjectiveKind::Control || self.completed.contains(&obj.id) {
                continue;
            }
            if controls(obj, models) {
                obj.control_streak += 1;
            } else {
                obj.control_streak = 0;
            }
        }
    }

    /// Evaluate every open objective against the current models.
    pub fn check(&mut self, models: &[ModelState], turn: u32) -> ObjectiveReport {
        let mut report = ObjectiveReport::default();
        for obj in &self.objectives {
            if self.completed.contains(&obj.id) {
                continue;
            }
            if is_satisfied(obj, models, turn) {
                report.awarded.push(Award {
                    objective: obj.id.clone(),
                    side: obj.side,
                    points: obj.config.points,
                });
            }
        }
        for award in &report.awarded {
            self.completed.insert(award.objective.clone());
        }
        for obj in &self.objectives {
            if self.completed.contains(&obj.id) {
                report.completed.push(obj.id.clone());
            } else {
                report.active.push(obj.id.clone());
            }
        }
        report
    }

    pub fn views(&self) -> Vec<ObjectiveView> {
        self.objectives
            .iter()
            .map(|obj| ObjectiveView {
                id: obj.id.clone(),
                kind: obj.config.kind,
                side: obj.side,
                points: obj.config.points,
                completed: self.completed.contains(&obj.id),
                control_streak: obj.control_streak,
            })
            .collect()
    }
}

fn target<'m>(obj: &Objective, models: &'m [ModelState]) -> Option<&'m ModelState> {
    let name = obj.config.target.as_deref()?;
    models.iter().find(|m| m.identifier == name)
}

fn active_in_zone(obj: &Objective, models: &[ModelState], side: Side) -> usize {
    let Some(zone) = obj.config.location else {
        return 0;
    };
    models
        .iter()
        .filter(|m| m.side == side && m.is_active() && zone.contains(&m.position))
        .count()
}

fn controls(obj: &Objective, models: &[ModelState]) -> bool {
    active_in_zone(obj, models, obj.side) > active_in_zone(obj, models, obj.side.opponent())
}

fn is_satisfied(obj: &Objective, models: &[ModelState], turn: u32) -> bool {
    match obj.config.kind {
        ObjectiveKind::Eliminate => target(obj, models).map_or(true, |t| !t.is_active()),
        ObjectiveKind::Destroy => target(obj, models).map_or(true, |t| t.eliminated),
        ObjectiveKind::Control => match obj.config.duration {
            Some(turns) if turns > 0 => obj.control_streak >= turns,
            _ => controls(obj, models),
        },
        ObjectiveKind::Survive => {
            let alive = models.iter().any(|m| m.side == obj.side && m.is_active());
            alive && obj.config.duration.is_some_and(|d| turn >= d)
        }
        ObjectiveKind::Capture => {
            active_in_zone(obj, models, obj.side) >= 1
                && active_in_zone(obj, models, obj.side.opponent()) == 0
        }
        ObjectiveKind::Escort => {
            let Some(zone) = obj.config.location else {
                return false;
            };
            target(obj, models)
                .is_some_and(|t| t.side == obj.side && t.is_active() && zone.contains(&t.position))
        }
        ObjectiveKind::Intercept => {
            let Some(quarry) = target(obj, models) else {
                return false;
            };
            let reach = obj.config.location.map_or(MELEE_RANGE_MU, |z| z.radius);
            models.iter().any(|m| {
                m.side == obj.side
                    && m.id != quarry.id
                    && m.is_active()
                    && m.position.distance_to(&quarry.position) <= reach
            })
        }
    }
}
