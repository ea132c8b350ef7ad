//! Snapshot builder: reads battlefield state into a `BattlefieldSnapshot`.
//!
//! Read-only; never modifies the roster or any ledger.

use hecs::World;

use mest_core::components::{ActionState, ModelInfo, Statuses};
use mest_core::enums::{MissionPhase, Side};
use mest_core::events::RulesEvent;
use mest_core::state::{BattlefieldSnapshot, ModelView};
use mest_core::types::{BattlefieldSize, ModelId, Position};
use mest_terrain::TerrainMap;

use crate::hindrance::{available_ap, HindranceTracker};
use crate::objectives::ObjectiveTracker;
use crate::tokens::{merged_counts, TokenLedger};
use crate::victory::VictoryState;

/// Everything a snapshot is built from.
pub struct SnapshotSources<'a> {
    pub world: &'a World,
    pub terrain: &'a TerrainMap,
    pub tokens: &'a TokenLedger,
    pub hindrances: &'a HindranceTracker,
    pub objectives: &'a ObjectiveTracker,
    pub victory: &'a VictoryState,
    pub battlefield: Option<BattlefieldSize>,
}

pub fn build_snapshot(
    src: &SnapshotSources<'_>,
    turn: u32,
    phase: MissionPhase,
    events: Vec<RulesEvent>,
) -> BattlefieldSnapshot {
    BattlefieldSnapshot {
        turn,
        phase,
        battlefield: src.battlefield,
        terrain: src.terrain.views(),
        models: build_models(src),
        objectives: src.objectives.views(),
        score: src.victory.view(),
        events,
    }
}

/// Model views in ascending id order.
fn build_models(src: &SnapshotSources<'_>) -> Vec<ModelView> {
    let mut query = src
        .world
        .query::<(&ModelId, &Side, &Position, &ModelInfo, &ActionState, &Statuses)>();
    let mut models: Vec<ModelView> = query
        .iter()
        .map(|(_, (id, side, pos, info, action, statuses))| {
            let delay = src.hindrances.get(*id).delay;
            ModelView {
                id: *id,
                side: *side,
                identifier: info.identifier.clone(),
                position: *pos,
                height: info.height,
                ap_spent: action.ap_spent,
                available_ap: available_ap(action.ap_spent, delay).max(0.0),
                statuses: statuses.0.clone(),
                tokens: merged_counts(src.tokens, src.hindrances, *id)
                    .into_iter()
                    .collect(),
            }
        })
        .collect();
    models.sort_by_key(|m| m.id);
    models
}
