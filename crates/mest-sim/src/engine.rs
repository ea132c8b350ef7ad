//! Battlefield session: the rules engine's command/query surface.
//!
//! `Battlefield` owns the terrain map, the model roster, the token ledger,
//! the hindrance tracker, objectives, victory state, the dice source and the
//! command history. Every operation runs to completion before returning;
//! turn progression is driven by the caller.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use mest_ai::scorer::{CLOSE_COMBAT_AP, RANGED_COMBAT_AP};
use mest_ai::{get_profile, ActionCandidate, AiProfileKind, TacticalView, UnitView};
use mest_core::commands::Command;
use mest_core::constants::{
    END_GAME_DIE_MISS_MAX, MELEE_RANGE_MU, PATH_GRID_CELL_MU, RANGED_RANGE_MU,
};
use mest_core::enums::*;
use mest_core::error::{CombatError, EngineError, EngineResult, MoveError, PlacementError};
use mest_core::events::RulesEvent;
use mest_core::mission::{MissionConfig, TerrainEntry};
use mest_core::state::{BattlefieldSnapshot, MissionResult};
use mest_core::types::{ModelId, Position, TerrainId};
use mest_terrain::{validate_los, CostTable, LosResult, Pathfinder, TerrainMap, TerrainObject, Viewer};

use crate::combat::{hit_probability, roll_combat, CombatModifiers, CombatRoll};
use crate::cover::{self, CoverAnalyzer, DefensiveBonus, DefensivePosition, TerrainCover};
use crate::dice::DiceRoller;
use crate::hindrance::{self, HindranceTracker, Hindrances};
use crate::objectives::{ModelState, ObjectiveReport, ObjectiveTracker};
use crate::roster::Roster;
use crate::snapshot::{build_snapshot, SnapshotSources};
use crate::tokens::{merged_counts, TokenLedger};
use crate::victory::{final_result, EndGameSchedule, VictoryState};
use crate::world_setup;

/// Configuration for a battlefield session.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed and commands = same battle.
    pub seed: u64,
    /// Reject missions whose BP falls outside the game-size band.
    pub strict_bp: bool,
    /// Path grid resolution (MU per cell).
    pub path_cell_mu: f64,
    pub costs: CostTable,
    /// Replaces the game-size end-game table when set.
    pub end_game: Option<EndGameSchedule>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            strict_bp: false,
            path_cell_mu: PATH_GRID_CELL_MU,
            costs: CostTable::default(),
            end_game: None,
        }
    }
}

/// Result of a successful move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub final_position: Position,
    pub ap_cost: f64,
}

/// The battlefield session. Owns all rules state.
pub struct Battlefield {
    config: SimConfig,
    mission: Option<MissionConfig>,
    terrain: TerrainMap,
    roster: Roster,
    tokens: TokenLedger,
    hindrances: HindranceTracker,
    objectives: ObjectiveTracker,
    victory: VictoryState,
    schedule: Option<EndGameSchedule>,
    ai_profiles: [AiProfileKind; 2],
    turn: u32,
    phase: MissionPhase,
    dice: Box<dyn DiceRoller>,
    cover: Box<dyn CoverAnalyzer>,
    events: Vec<RulesEvent>,
    history: Vec<Command>,
}

impl Battlefield {
    /// Create an empty battlefield with seeded dice.
    pub fn new(config: SimConfig) -> Self {
        let dice = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_dice(config, dice)
    }

    /// Create an empty battlefield rolling through `dice`.
    pub fn with_dice(config: SimConfig, dice: impl DiceRoller + 'static) -> Self {
        Self {
            config,
            mission: None,
            terrain: TerrainMap::default(),
            roster: Roster::new(),
            tokens: TokenLedger::new(),
            hindrances: HindranceTracker::new(),
            objectives: ObjectiveTracker::new(),
            victory: VictoryState::default(),
            schedule: None,
            ai_profiles: [AiProfileKind::default(); 2],
            turn: 0,
            phase: MissionPhase::Setup,
            dice: Box::new(dice),
            cover: Box::new(TerrainCover),
            events: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Replace the cover heuristic.
    pub fn set_cover_analyzer(&mut self, analyzer: impl CoverAnalyzer + 'static) {
        self.cover = Box::new(analyzer);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    pub fn mission(&self) -> Option<&MissionConfig> {
        self.mission.as_ref()
    }

    pub fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn objectives(&self) -> &ObjectiveTracker {
        &self.objectives
    }

    pub fn victory(&self) -> &VictoryState {
        &self.victory
    }

    /// Every successful state-changing command, in order.
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    /// Apply a serialized command.
    pub fn execute(&mut self, command: Command) -> EngineResult<()> {
        match command {
            Command::LoadMission { mission } => self.load_mission(*mission),
            Command::StartNewTurn => self.start_new_turn().map(drop),
            Command::ProcessEndOfTurn => self.process_end_of_turn().map(drop),
            Command::CheckObjectives => self.check_objectives().map(drop),
            Command::PlaceTerrain { entry } => {
                self.place_terrain(&entry)?;
                Ok(())
            }
            Command::RemoveTerrain { id } => self.remove_terrain(id).map(drop),
            Command::ClearTerrain => {
                self.clear_terrain();
                Ok(())
            }
            Command::MoveModel { model, target } => self.move_model(model, target).map(drop),
            Command::AddToken {
                model,
                token,
                count,
            } => self.add_token(model, token, count.unwrap_or(1)).map(drop),
            Command::RemoveToken { model, token } => self.remove_token(model, token).map(drop),
            Command::AddHindrance { model, kind } => self.add_hindrance(model, kind).map(drop),
            Command::RemoveHindrance { model, kind } => {
                self.remove_hindrance(model, kind).map(drop)
            }
            Command::ClearTokens { model } => self.clear_tokens(model),
            Command::ResolveCombat {
                attacker,
                defender,
                kind,
            } => self.resolve_combat(attacker, defender, kind).map(drop),
            Command::ResolveMoraleTest { side, passed } => self.resolve_morale_test(side, passed),
        }
    }

    /// Build a snapshot and drain pending events into it.
    pub fn snapshot(&mut self) -> BattlefieldSnapshot {
        let events = std::mem::take(&mut self.events);
        let sources = SnapshotSources {
            world: self.roster.world(),
            terrain: &self.terrain,
            tokens: &self.tokens,
            hindrances: &self.hindrances,
            objectives: &self.objectives,
            victory: &self.victory,
            battlefield: self.mission.as_ref().map(|_| self.terrain.size()),
        };
        build_snapshot(&sources, self.turn, self.phase, events)
    }

    // --- Mission lifecycle ---

    /// Replace the whole battlefield with a mission. Validation failures
    /// leave the current state untouched.
    pub fn load_mission(&mut self, config: MissionConfig) -> EngineResult<()> {
        let loaded = world_setup::load_mission(&config, self.config.strict_bp, &self.config.costs)?;

        let side_a = loaded.roster.ids_for(Side::SideA).len();
        let side_b = loaded.roster.ids_for(Side::SideB).len();
        self.terrain = loaded.terrain;
        self.roster = loaded.roster;
        self.ai_profiles = loaded.ai_profiles;
        self.tokens.clear();
        self.hindrances.clear();
        self.objectives.set_objectives(&config.objectives);
        self.victory = VictoryState::new(side_a, side_b);
        self.schedule = Some(
            self.config
                .end_game
                .clone()
                .unwrap_or_else(|| EndGameSchedule::for_size(config.game_size)),
        );
        self.turn = 1;
        self.phase = MissionPhase::Active;

        info!(
            mission = %config.name,
            side_a,
            side_b,
            terrain = self.terrain.len(),
            skipped_terrain = loaded.skipped_terrain,
            battlefield = loaded.size.side,
            "mission loaded"
        );
        self.events.push(RulesEvent::MissionLoaded {
            name: config.name.clone(),
        });
        self.history.push(Command::LoadMission {
            mission: Box::new(config.clone()),
        });
        self.mission = Some(config);
        Ok(())
    }

    fn require_active(&self) -> EngineResult<()> {
        match self.phase {
            MissionPhase::Active => Ok(()),
            _ => Err(EngineError::MissionNotActive),
        }
    }

    /// Begin the next turn: reset AP and purge turn-scoped tokens.
    pub fn start_new_turn(&mut self) -> EngineResult<u32> {
        self.require_active()?;
        self.turn += 1;
        self.roster.reset_ap();
        let purged = self.tokens.purge_turn_scoped();
        info!(turn = self.turn, purged, "turn started");
        self.events.push(RulesEvent::TurnStarted { turn: self.turn });
        self.history.push(Command::StartNewTurn);
        Ok(self.turn)
    }

    /// Turn-end sequence: morale, objective bookkeeping, no opposing models,
    /// aggression, end-game dice, turn limit. Stops at the first check that
    /// ends the mission; objectives are scored before any of them can.
    pub fn process_end_of_turn(&mut self) -> EngineResult<MissionPhase> {
        self.require_active()?;
        self.history.push(Command::ProcessEndOfTurn);
        let states = self.model_states();

        for side in Side::BOTH {
            let active = count_active(&states, side);
            if active * 2 < self.victory.starting_models(side) && self.victory.trigger_morale(side) {
                info!(side = side.as_str(), active, "morale test triggered");
                self.events.push(RulesEvent::MoraleTestTriggered { side });
            }
        }

        self.objectives.end_of_turn(&states);
        self.award_objectives(&states);

        if Side::BOTH.iter().any(|&side| count_active(&states, side) == 0) {
            self.end_mission(EndReason::NoOpposingModels);
            return Ok(self.phase);
        }

        for side in Side::BOTH {
            if self.victory.check_aggression(side, self.roster.crossed_count(side)) {
                info!(side = side.as_str(), "aggression bonus");
                self.events.push(RulesEvent::AggressionBonus { side });
            }
        }

        if self.roll_end_game() {
            self.end_mission(EndReason::EndGameTrigger);
            return Ok(self.phase);
        }

        let limit = self
            .mission
            .as_ref()
            .and_then(|m| m.special_rules.turn_limit);
        if limit.is_some_and(|limit| self.turn >= limit) {
            self.end_mission(EndReason::TurnLimit);
        }
        Ok(self.phase)
    }

    /// Grow the dice pool per the schedule, then roll every die. Returns
    /// `true` when any die misses.
    fn roll_end_game(&mut self) -> bool {
        let wanted = self.schedule.as_ref().map_or(0, |s| s.dice_at(self.turn));
        if self.victory.grow_end_game_dice(wanted) {
            self.events.push(RulesEvent::EndGameDieAdded {
                turn: self.turn,
                dice: wanted,
            });
        }
        let dice = self.victory.end_game_dice();
        if dice == 0 {
            return false;
        }
        let rolls: Vec<u8> = (0..dice).map(|_| self.dice.roll_d6()).collect();
        debug!(turn = self.turn, ?rolls, "end-game roll");
        let missed = rolls.iter().any(|&r| r <= END_GAME_DIE_MISS_MAX);
        self.events.push(RulesEvent::EndGameRoll {
            turn: self.turn,
            rolls,
        });
        missed
    }

    fn end_mission(&mut self, reason: EndReason) {
        self.phase = MissionPhase::Ended(reason);
        info!(turn = self.turn, ?reason, "mission ended");
        self.events.push(RulesEvent::MissionEnded {
            turn: self.turn,
            reason,
        });
    }

    /// Evaluate objectives and award newly completed ones.
    pub fn check_objectives(&mut self) -> EngineResult<ObjectiveReport> {
        if self.mission.is_none() {
            return Err(EngineError::MissionNotActive);
        }
        let states = self.model_states();
        let report = self.award_objectives(&states);
        self.history.push(Command::CheckObjectives);
        Ok(report)
    }

    fn award_objectives(&mut self, states: &[ModelState]) -> ObjectiveReport {
        let report = self.objectives.check(states, self.turn);
        for award in &report.awarded {
            self.victory.add_vp(award.side, award.points);
            info!(objective = %award.objective, side = award.side.as_str(), points = award.points, "objective completed");
            self.events.push(RulesEvent::ObjectiveCompleted {
                objective: award.objective.clone(),
                side: award.side,
                points: award.points,
            });
        }
        report
    }

    pub fn resolve_morale_test(&mut self, side: Side, passed: bool) -> EngineResult<()> {
        self.victory
            .resolve_morale(side, passed)
            .ok_or(EngineError::NoMoraleTestPending(side))?;
        if !passed {
            info!(side = side.as_str(), "side bottled out");
            self.events.push(RulesEvent::BottledOut { side });
        }
        self.history.push(Command::ResolveMoraleTest { side, passed });
        Ok(())
    }

    /// Current scoring. Final once the mission has ended.
    pub fn mission_result(&self) -> MissionResult {
        let ordered = Side::BOTH.map(|side| {
            self.roster
                .ids_for(side)
                .into_iter()
                .filter(|&id| !self.is_out_of_action(id) && self.hindrances.get(id).is_ordered())
                .count()
        });
        let reason = match self.phase {
            MissionPhase::Ended(reason) => Some(reason),
            _ => None,
        };
        final_result(&self.victory, ordered, self.turn, reason)
    }

    // --- Terrain ---

    pub fn place_terrain(&mut self, entry: &TerrainEntry) -> Result<TerrainId, PlacementError> {
        let id = self.terrain.place(entry)?;
        self.events.push(RulesEvent::TerrainPlaced {
            id,
            kind: entry.kind,
        });
        self.history.push(Command::PlaceTerrain {
            entry: entry.clone(),
        });
        Ok(id)
    }

    pub fn remove_terrain(&mut self, id: TerrainId) -> EngineResult<TerrainObject> {
        let removed = self
            .terrain
            .remove(id)
            .ok_or(EngineError::UnknownTerrain(id))?;
        self.events.push(RulesEvent::TerrainRemoved { id });
        self.history.push(Command::RemoveTerrain { id });
        Ok(removed)
    }

    pub fn clear_terrain(&mut self) {
        for obj in self.terrain.objects() {
            self.events.push(RulesEvent::TerrainRemoved { id: obj.id });
        }
        self.terrain.clear();
        self.history.push(Command::ClearTerrain);
    }

    pub fn is_valid_placement(&self, entry: &TerrainEntry) -> Result<(), PlacementError> {
        self.terrain.validate(&self.terrain.candidate(entry))
    }

    // --- Queries ---

    fn pathfinder(&self) -> Pathfinder<'_> {
        Pathfinder::new(&self.terrain, self.config.costs, self.config.path_cell_mu)
    }

    fn viewer(&self, id: ModelId) -> EngineResult<Viewer> {
        let info = self.roster.info(id)?;
        Ok(Viewer::new(self.roster.position(id)?, info.height))
    }

    pub fn validate_los(&self, a: ModelId, b: ModelId) -> EngineResult<LosResult> {
        Ok(validate_los(&self.terrain, &self.viewer(a)?, &self.viewer(b)?))
    }

    fn positions(&self, models: &[ModelId]) -> EngineResult<Vec<Position>> {
        models.iter().map(|&id| self.roster.position(id)).collect()
    }

    pub fn calculate_defensive_bonus(
        &self,
        position: &Position,
        enemies: &[ModelId],
    ) -> EngineResult<DefensiveBonus> {
        let enemies = self.positions(enemies)?;
        Ok(cover::calculate_defensive_bonus(
            &self.terrain,
            self.cover.as_ref(),
            position,
            &enemies,
        ))
    }

    pub fn find_best_defensive_position(
        &self,
        start: &Position,
        enemies: &[ModelId],
        max_ap: f64,
    ) -> EngineResult<DefensivePosition> {
        let enemies = self.positions(enemies)?;
        let pathfinder = self.pathfinder();
        Ok(cover::find_best_defensive_position(
            &self.terrain,
            self.cover.as_ref(),
            &pathfinder,
            start,
            &enemies,
            max_ap,
        ))
    }

    pub fn token_counts(&self, model: ModelId) -> EngineResult<BTreeMap<TokenKind, u32>> {
        self.require_model(model)?;
        Ok(merged_counts(&self.tokens, &self.hindrances, model))
    }

    pub fn hindrances(&self, model: ModelId) -> EngineResult<Hindrances> {
        self.require_model(model)?;
        Ok(self.hindrances.get(model))
    }

    /// `2 − AP spent − delay`. Negative values mean no AP left.
    pub fn available_ap(&self, model: ModelId) -> EngineResult<f64> {
        let spent = self.roster.ap_spent(model)?;
        Ok(hindrance::available_ap(spent, self.hindrances.get(model).delay))
    }

    fn require_model(&self, model: ModelId) -> EngineResult<()> {
        if self.roster.contains(model) {
            Ok(())
        } else {
            Err(EngineError::UnknownModel(model))
        }
    }

    /// Carries a `ko` or `eliminated` marker.
    pub fn is_out_of_action(&self, model: ModelId) -> bool {
        self.tokens.has(model, TokenKind::Ko) || self.tokens.has(model, TokenKind::Eliminated)
    }

    fn model_states(&self) -> Vec<ModelState> {
        self.roster
            .ids()
            .into_iter()
            .filter_map(|id| {
                let info = self.roster.info(id).ok()?;
                Some(ModelState {
                    id,
                    side: self.roster.side(id).ok()?,
                    identifier: info.identifier,
                    position: self.roster.position(id).ok()?,
                    ko: self.tokens.has(id, TokenKind::Ko),
                    eliminated: self.tokens.has(id, TokenKind::Eliminated),
                })
            })
            .collect()
    }

    // --- Models ---

    /// Move along the cheapest legal path, spending its AP cost.
    pub fn move_model(&mut self, model: ModelId, target: Position) -> EngineResult<MoveOutcome> {
        self.require_active()?;
        let from = self.roster.position(model)?;
        if self.is_out_of_action(model) {
            return Err(MoveError::OutOfAction { model }.into());
        }
        let available = self.available_ap(model)?.max(0.0);
        let path = self
            .pathfinder()
            .find_path_with_cost(&from, &target)
            .ok_or(MoveError::NoPath { model })?;
        if path.cost > available + 1e-9 {
            return Err(MoveError::InsufficientAp {
                model,
                required: path.cost,
                available,
            }
            .into());
        }

        self.roster.set_position(model, target)?;
        self.roster.spend_ap(model, path.cost)?;
        debug!(%model, cost = path.cost, x = target.x, y = target.y, "model moved");
        self.events.push(RulesEvent::ModelMoved {
            model,
            from,
            to: target,
            ap_cost: path.cost,
        });

        let side = self.roster.side(model)?;
        if target.y * side.forward_sign() > 0.0
            && self.roster.mark_crossed(model)?
            && self.victory.record_crossing(side)
        {
            info!(%model, side = side.as_str(), "first center-line crossing");
            self.events.push(RulesEvent::FirstCrossing { side, model });
        }

        self.history.push(Command::MoveModel { model, target });
        Ok(MoveOutcome {
            final_position: target,
            ap_cost: path.cost,
        })
    }

    /// Add tokens. Hindrance kinds go to the hindrance tracker; returns the
    /// resulting count of `kind`.
    pub fn add_token(&mut self, model: ModelId, kind: TokenKind, count: u32) -> EngineResult<u32> {
        self.require_model(model)?;
        let total = match kind.hindrance() {
            Some(h) => {
                for _ in 0..count {
                    self.apply_hindrance(model, h)?;
                }
                self.hindrances.get(model).get(h)
            }
            None => self.apply_token(model, kind, count)?,
        };
        self.history.push(Command::AddToken {
            model,
            token: kind,
            count: Some(count),
        });
        Ok(total)
    }

    fn apply_token(&mut self, model: ModelId, kind: TokenKind, count: u32) -> EngineResult<u32> {
        let before = self.tokens.count(model, kind);
        let total = self.tokens.add(model, kind, count);
        if matches!(kind, TokenKind::Ko | TokenKind::Eliminated) && before == 0 && total > 0 {
            let side = self.roster.side(model)?;
            let bp = self.roster.info(model)?.bp;
            self.victory.record_loss(model, side, bp);
            info!(%model, token = ?kind, "model out of action");
            self.events.push(RulesEvent::ModelOutOfAction { model, token: kind });
        }
        Ok(total)
    }

    pub fn remove_token(&mut self, model: ModelId, kind: TokenKind) -> EngineResult<u32> {
        self.require_model(model)?;
        let left = match kind.hindrance() {
            Some(h) => self.lift_hindrance(model, h)?.get(h),
            None => self.tokens.remove(model, kind),
        };
        self.history.push(Command::RemoveToken { model, token: kind });
        Ok(left)
    }

    pub fn add_hindrance(&mut self, model: ModelId, kind: HindranceKind) -> EngineResult<Hindrances> {
        self.require_model(model)?;
        let counts = self.apply_hindrance(model, kind)?;
        self.history.push(Command::AddHindrance { model, kind });
        Ok(counts)
    }

    pub fn remove_hindrance(&mut self, model: ModelId, kind: HindranceKind) -> EngineResult<Hindrances> {
        self.require_model(model)?;
        let counts = self.lift_hindrance(model, kind)?;
        self.history.push(Command::RemoveHindrance { model, kind });
        Ok(counts)
    }

    /// Wipe a model's ledger entry and hindrance counters. Losses already
    /// recorded for a KO or elimination stand.
    pub fn clear_tokens(&mut self, model: ModelId) -> EngineResult<()> {
        self.require_model(model)?;
        self.tokens.clear_model(model);
        self.hindrances.clear_model(model);
        self.sync_statuses(model, &Hindrances::default())?;
        debug!(%model, "tokens cleared");
        self.history.push(Command::ClearTokens { model });
        Ok(())
    }

    /// Wounds reaching the profile's threshold knock the model out.
    fn apply_hindrance(&mut self, model: ModelId, kind: HindranceKind) -> EngineResult<Hindrances> {
        let counts = self.hindrances.add(model, kind);
        self.sync_statuses(model, &counts)?;
        if kind == HindranceKind::Wound {
            let threshold = self.roster.info(model)?.profile.wounds_to_ko;
            if counts.wounds >= threshold {
                self.apply_token(model, TokenKind::Ko, 1)?;
            }
        }
        Ok(counts)
    }

    fn lift_hindrance(&mut self, model: ModelId, kind: HindranceKind) -> EngineResult<Hindrances> {
        let counts = self.hindrances.remove(model, kind);
        self.sync_statuses(model, &counts)?;
        Ok(counts)
    }

    fn sync_statuses(&mut self, model: ModelId, counts: &Hindrances) -> EngineResult<()> {
        let statuses = counts.statuses();
        if self.roster.statuses(model)? != statuses {
            self.roster.set_statuses(model, statuses.clone())?;
            self.events.push(RulesEvent::StatusChanged { model, statuses });
        }
        Ok(())
    }

    // --- Combat ---

    fn combat_modifiers(
        &self,
        attacker: ModelId,
        defender: ModelId,
        kind: CombatKind,
    ) -> EngineResult<CombatModifiers> {
        let attack = self.roster.info(attacker)?.profile;
        let defence = self.roster.info(defender)?.profile;
        let from = self.roster.position(attacker)?;
        let at = self.roster.position(defender)?;
        let bonus = cover::calculate_defensive_bonus(&self.terrain, self.cover.as_ref(), &at, &[from]);
        Ok(CombatModifiers::new(kind, &attack, &defence, bonus.total))
    }

    /// Exact hit probability without touching state or dice.
    pub fn estimate_combat(&self, attacker: ModelId, defender: ModelId, kind: CombatKind) -> EngineResult<f64> {
        Ok(hit_probability(self.combat_modifiers(attacker, defender, kind)?))
    }

    /// Commit an attack: check legality, spend AP, roll, and wound on a hit.
    pub fn resolve_combat(
        &mut self,
        attacker: ModelId,
        defender: ModelId,
        kind: CombatKind,
    ) -> EngineResult<CombatRoll> {
        self.require_active()?;
        self.check_attack(attacker, defender, kind)?;
        let mods = self.combat_modifiers(attacker, defender, kind)?;
        let roll = roll_combat(self.dice.as_mut(), kind, mods);
        let cost = match kind {
            CombatKind::Close => CLOSE_COMBAT_AP,
            CombatKind::Ranged => RANGED_COMBAT_AP,
        };
        self.roster.spend_ap(attacker, cost)?;
        if roll.hit {
            self.apply_hindrance(defender, HindranceKind::Wound)?;
        }
        debug!(%attacker, %defender, ?kind, attack = roll.attack_total, defence = roll.defence_total, hit = roll.hit, "combat resolved");
        self.events.push(RulesEvent::CombatResolved {
            attacker,
            defender,
            kind,
            hit: roll.hit,
        });
        self.history.push(Command::ResolveCombat {
            attacker,
            defender,
            kind,
        });
        Ok(roll)
    }

    fn check_attack(&self, attacker: ModelId, defender: ModelId, kind: CombatKind) -> EngineResult<()> {
        let side = self.roster.side(attacker)?;
        if self.roster.side(defender)? == side {
            return Err(CombatError::SameSide { attacker, defender }.into());
        }
        for model in [attacker, defender] {
            if self.is_out_of_action(model) {
                return Err(CombatError::OutOfAction { model }.into());
            }
        }
        let distance = self
            .roster
            .position(attacker)?
            .distance_to(&self.roster.position(defender)?);
        let (required, max) = match kind {
            CombatKind::Close => (CLOSE_COMBAT_AP, MELEE_RANGE_MU),
            CombatKind::Ranged => (RANGED_COMBAT_AP, RANGED_RANGE_MU),
        };
        if kind == CombatKind::Ranged && !self.can_shoot(attacker)? {
            return Err(CombatError::CannotShoot { model: attacker }.into());
        }
        if distance > max {
            return Err(CombatError::OutOfRange {
                attacker,
                defender,
                distance,
                max,
            }
            .into());
        }
        if kind == CombatKind::Ranged && !self.validate_los(attacker, defender)?.has_los {
            return Err(CombatError::NoLineOfSight { attacker, defender }.into());
        }
        let available = self.available_ap(attacker)?;
        if available < required {
            return Err(CombatError::InsufficientAp {
                model: attacker,
                required,
                available: available.max(0.0),
            }
            .into());
        }
        Ok(())
    }

    fn can_shoot(&self, model: ModelId) -> EngineResult<bool> {
        let ranged = self.roster.info(model)?.profile.ranged;
        Ok(ranged && !self.tokens.has(model, TokenKind::OutOfAmmo))
    }

    // --- AI ---

    fn unit_view(&self, id: ModelId) -> EngineResult<UnitView> {
        Ok(UnitView {
            id,
            side: self.roster.side(id)?,
            position: self.roster.position(id)?,
            available_ap: self.available_ap(id)?.max(0.0),
            can_shoot: self.can_shoot(id)?,
            hidden: self.tokens.has(id, TokenKind::Hidden),
        })
    }

    pub fn ai_profile(&self, side: Side) -> AiProfileKind {
        match side {
            Side::SideA => self.ai_profiles[0],
            Side::SideB => self.ai_profiles[1],
        }
    }

    /// Pick the best action for `model` with its side's AI profile.
    /// Read-only: the caller decides whether to carry it out.
    pub fn decide_action(&self, model: ModelId) -> EngineResult<ActionCandidate> {
        let actor = self.unit_view(model)?;
        if self.is_out_of_action(model) {
            return Err(MoveError::OutOfAction { model }.into());
        }
        let enemies = self
            .roster
            .ids_for(actor.side.opponent())
            .into_iter()
            .filter(|&id| !self.is_out_of_action(id))
            .map(|id| self.unit_view(id))
            .collect::<EngineResult<Vec<_>>>()?;
        let profile = get_profile(self.ai_profile(actor.side));
        let view = BattlefieldView {
            battlefield: self,
            pathfinder: self.pathfinder(),
        };
        Ok(mest_ai::decide_action(&actor, &enemies, &view, &profile))
    }

    /// Spawn a model outside of mission loading (for tests).
    #[cfg(test)]
    pub fn spawn_test_model(&mut self, side: Side, position: Position) -> ModelId {
        use mest_core::components::{ModelInfo, ModelProfile};
        let n = self.roster.len() + 1;
        self.roster
            .spawn(side, position, ModelInfo::new(format!("T{n}"), ModelProfile::default(), 50))
    }

    /// Force the mission phase (for tests).
    #[cfg(test)]
    pub fn set_phase(&mut self, phase: MissionPhase) {
        self.phase = phase;
    }
}

fn count_active(states: &[ModelState], side: Side) -> usize {
    states
        .iter()
        .filter(|s| s.side == side && s.is_active())
        .count()
}

/// Read-only battlefield queries for the AI scorer.
struct BattlefieldView<'a> {
    battlefield: &'a Battlefield,
    pathfinder: Pathfinder<'a>,
}

impl TacticalView for BattlefieldView<'_> {
    fn has_line_of_sight(&self, from: ModelId, to: ModelId) -> bool {
        self.battlefield
            .validate_los(from, to)
            .is_ok_and(|los| los.has_los)
    }

    fn hit_chance(&self, attacker: ModelId, defender: ModelId, kind: CombatKind) -> f64 {
        self.battlefield
            .estimate_combat(attacker, defender, kind)
            .unwrap_or(0.0)
    }

    fn defensive_bonus(&self, at: &Position, enemies: &[Position]) -> i32 {
        let bf = self.battlefield;
        cover::calculate_defensive_bonus(&bf.terrain, bf.cover.as_ref(), at, enemies).total
    }

    fn best_defensive_position(&self, start: &Position, enemies: &[Position], max_ap: f64) -> Position {
        let bf = self.battlefield;
        cover::find_best_defensive_position(
            &bf.terrain,
            bf.cover.as_ref(),
            &self.pathfinder,
            start,
            enemies,
            max_ap,
        )
        .position
    }

    fn closest_reachable_point(&self, start: &Position, target: &Position, max_ap: f64) -> Position {
        self.pathfinder.closest_reachable_point(start, target, max_ap)
    }
}
