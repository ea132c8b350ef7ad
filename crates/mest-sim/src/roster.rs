//! Model roster: a hecs world of model entities indexed by `ModelId`.
//!
//! Models are never despawned during a mission. Elimination is carried by
//! tokens, so ids stay valid for the whole session.

use std::collections::{BTreeMap, HashSet};

use hecs::{Entity, World};

use mest_core::components::{ActionState, ModelInfo, Statuses};
use mest_core::constants::{SIDE_A_IDENTIFIERS, SIDE_B_IDENTIFIERS};
use mest_core::enums::{ModelStatus, Side};
use mest_core::error::{EngineError, EngineResult};
use mest_core::types::{ModelId, Position};

/// Marker: the model has crossed the center line toward the enemy.
#[derive(Debug, Clone, Copy)]
pub struct CenterLineCrossed;

pub struct Roster {
    world: World,
    index: BTreeMap<ModelId, Entity>,
    next_id: u32,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            world: World::new(),
            index: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a model with fresh per-turn state.
    pub fn spawn(&mut self, side: Side, position: Position, info: ModelInfo) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        let entity = self.world.spawn((
            id,
            side,
            position,
            info,
            ActionState::default(),
            Statuses::default(),
        ));
        self.index.insert(id, entity);
        id
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.index.clear();
        self.next_id = 1;
    }

    /// Read-only access to the model world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: ModelId) -> bool {
        self.index.contains_key(&id)
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<ModelId> {
        self.index.keys().copied().collect()
    }

    /// Ids of one side, ascending.
    pub fn ids_for(&self, side: Side) -> Vec<ModelId> {
        self.index
            .iter()
            .filter(|(_, e)| self.world.get::<&Side>(**e).is_ok_and(|s| *s == side))
            .map(|(&id, _)| id)
            .collect()
    }

    fn entity(&self, id: ModelId) -> EngineResult<Entity> {
        self.index
            .get(&id)
            .copied()
            .ok_or(EngineError::UnknownModel(id))
    }

    pub fn side(&self, id: ModelId) -> EngineResult<Side> {
        let e = self.entity(id)?;
        let side = self
            .world
            .get::<&Side>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        Ok(*side)
    }

    pub fn position(&self, id: ModelId) -> EngineResult<Position> {
        let e = self.entity(id)?;
        let pos = self
            .world
            .get::<&Position>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        Ok(*pos)
    }

    pub fn set_position(&mut self, id: ModelId, position: Position) -> EngineResult<()> {
        let e = self.entity(id)?;
        let mut pos = self
            .world
            .get::<&mut Position>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        *pos = position;
        Ok(())
    }

    pub fn info(&self, id: ModelId) -> EngineResult<ModelInfo> {
        let e = self.entity(id)?;
        let info = self
            .world
            .get::<&ModelInfo>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        Ok((*info).clone())
    }

    pub fn ap_spent(&self, id: ModelId) -> EngineResult<f64> {
        let e = self.entity(id)?;
        let state = self
            .world
            .get::<&ActionState>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        Ok(state.ap_spent)
    }

    pub fn spend_ap(&mut self, id: ModelId, ap: f64) -> EngineResult<()> {
        let e = self.entity(id)?;
        let mut state = self
            .world
            .get::<&mut ActionState>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        state.ap_spent += ap;
        Ok(())
    }

    /// Zero every model's spent AP.
    pub fn reset_ap(&mut self) {
        for (_entity, state) in self.world.query_mut::<&mut ActionState>() {
            state.ap_spent = 0.0;
        }
    }

    pub fn statuses(&self, id: ModelId) -> EngineResult<Vec<ModelStatus>> {
        let e = self.entity(id)?;
        let statuses = self
            .world
            .get::<&Statuses>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        Ok(statuses.0.clone())
    }

    pub fn set_statuses(&mut self, id: ModelId, statuses: Vec<ModelStatus>) -> EngineResult<()> {
        let e = self.entity(id)?;
        let mut current = self
            .world
            .get::<&mut Statuses>(e)
            .map_err(|_| EngineError::UnknownModel(id))?;
        current.0 = statuses;
        Ok(())
    }

    /// Record a center-line crossing. Returns `true` the first time only.
    pub fn mark_crossed(&mut self, id: ModelId) -> EngineResult<bool> {
        let e = self.entity(id)?;
        if self.world.get::<&CenterLineCrossed>(e).is_ok() {
            return Ok(false);
        }
        self.world
            .insert_one(e, CenterLineCrossed)
            .map_err(|_| EngineError::UnknownModel(id))?;
        Ok(true)
    }

    pub fn crossed_count(&self, side: Side) -> usize {
        let mut query = self.world.query::<(&Side, &CenterLineCrossed)>();
        query.iter().filter(|(_, (s, _))| **s == side).count()
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<ModelId> {
        let mut query = self.world.query::<(&ModelId, &ModelInfo)>();
        let found = query
            .iter()
            .filter(|(_, (_, info))| info.identifier == identifier)
            .map(|(_, (id, _))| *id)
            .min();
        found
    }
}

/// Display identifiers handed out per side, unique across the battlefield.
#[derive(Debug, Clone, Default)]
pub struct IdentifierPool {
    used: HashSet<String>,
}

impl IdentifierPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a custom identifier. Returns `false` if it was already taken.
    pub fn reserve(&mut self, identifier: &str) -> bool {
        self.used.insert(identifier.to_string())
    }

    /// Next free letter from the side's pool. Letters already claimed by
    /// either side are skipped; an exhausted pool is reused with a numeric
    /// suffix (`A2`, `B2`, ...).
    pub fn assign(&mut self, side: Side) -> String {
        let letters = match side {
            Side::SideA => SIDE_A_IDENTIFIERS,
            Side::SideB => SIDE_B_IDENTIFIERS,
        };
        let mut round = 1u32;
        loop {
            for letter in letters {
                let candidate = if round == 1 {
                    letter.to_string()
                } else {
                    format!("{letter}{round}")
                };
                if self.used.insert(candidate.clone()) {
                    return candidate;
                }
            }
            round += 1;
        }
    }
}
