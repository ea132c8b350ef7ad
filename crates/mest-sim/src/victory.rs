//! End-game dice schedule and victory-point scoring.
//!
//! [`VictoryState`] accumulates per-side VP/RP and the one-shot flags during
//! play. [`final_result`] turns that state into a [`MissionResult`] without
//! side effects, so the same state always yields the same winner.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use mest_core::constants::*;
use mest_core::enums::{EndReason, GameSize, Side};
use mest_core::state::{MissionResult, ScoreView, SideScore, VpBreakdown};
use mest_core::types::ModelId;

/// Turns at which end-game dice join the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndGameSchedule {
    pub trigger_turn: u32,
    /// Each listed turn adds one more die.
    pub extra_turns: Vec<u32>,
}

impl EndGameSchedule {
    /// Trigger 4/6/8 for small/medium/large; one extra die two turns later.
    pub fn for_size(size: GameSize) -> Self {
        let trigger_turn = size.trigger_turn();
        Self {
            trigger_turn,
            extra_turns: vec![trigger_turn + END_GAME_EXTRA_DIE_OFFSET],
        }
    }

    /// Dice in the pool at the end of `turn`.
    pub fn dice_at(&self, turn: u32) -> u32 {
        if turn < self.trigger_turn {
            return 0;
        }
        1 + self.extra_turns.iter().filter(|&&t| t <= turn).count() as u32
    }
}

fn slot(side: Side) -> usize {
    match side {
        Side::SideA => 0,
        Side::SideB => 1,
    }
}

#[derive(Debug, Clone, Default)]
pub struct VictoryState {
    scores: [SideScore; 2],
    starting_models: [usize; 2],
    morale_triggered: [bool; 2],
    morale_pending: [bool; 2],
    aggression_awarded: [bool; 2],
    first_crossing: Option<Side>,
    end_game_dice: u32,
    losses: BTreeSet<ModelId>,
}

impl VictoryState {
    /// Fresh state for a mission; applies the outnumbering bonus.
    pub fn new(side_a_models: usize, side_b_models: usize) -> Self {
        let mut state = Self {
            starting_models: [side_a_models, side_b_models],
            ..Self::default()
        };
        if let Some((side, vp)) = outnumbering_bonus(side_a_models, side_b_models) {
            state.add_vp(side, vp);
        }
        state
    }

    pub fn score(&self, side: Side) -> &SideScore {
        &self.scores[slot(side)]
    }

    pub fn view(&self) -> ScoreView {
        ScoreView {
            side_a: self.scores[0],
            side_b: self.scores[1],
        }
    }

    pub fn starting_models(&self, side: Side) -> usize {
        self.starting_models[slot(side)]
    }

    pub fn add_vp(&mut self, side: Side, vp: u32) {
        self.scores[slot(side)].vp += vp;
    }

    pub fn add_rp(&mut self, side: Side, rp: u32) {
        self.scores[slot(side)].rp += rp;
    }

    /// Credit `bp` to the side that took `model` out of action. Each model
    /// counts once, whichever token removed it.
    pub fn record_loss(&mut self, model: ModelId, owner: Side, bp: u32) -> bool {
        if !self.losses.insert(model) {
            return false;
        }
        self.scores[slot(owner.opponent())].eliminated_bp += bp;
        true
    }

    /// Queue a morale test once per side per mission.
    pub fn trigger_morale(&mut self, side: Side) -> bool {
        let i = slot(side);
        if self.morale_triggered[i] {
            return false;
        }
        self.morale_triggered[i] = true;
        self.morale_pending[i] = true;
        true
    }

    pub fn morale_pending(&self, side: Side) -> bool {
        self.morale_pending[slot(side)]
    }

    /// Settle a pending morale test. Returns `None` if none was pending.
    pub fn resolve_morale(&mut self, side: Side, passed: bool) -> Option<bool> {
        let i = slot(side);
        if !self.morale_pending[i] {
            return None;
        }
        self.morale_pending[i] = false;
        if !passed {
            self.scores[i].bottled_out = true;
        }
        Some(passed)
    }

    /// Award the aggression VP once a side has at least half its starting
    /// models across the center line.
    pub fn check_aggression(&mut self, side: Side, crossed: usize) -> bool {
        let i = slot(side);
        if self.aggression_awarded[i] || self.starting_models[i] == 0 {
            return false;
        }
        if crossed * 2 < self.starting_models[i] {
            return false;
        }
        self.aggression_awarded[i] = true;
        self.scores[i].vp += AGGRESSION_VP;
        true
    }

    /// First crossing of the whole mission earns RP.
    pub fn record_crossing(&mut self, side: Side) -> bool {
        if self.first_crossing.is_some() {
            return false;
        }
        self.first_crossing = Some(side);
        self.add_rp(side, FIRST_CROSSING_RP);
        true
    }

    pub fn end_game_dice(&self) -> u32 {
        self.end_game_dice
    }

    /// Raise the dice pool to `dice`. Returns `true` if it grew.
    pub fn grow_end_game_dice(&mut self, dice: u32) -> bool {
        if dice <= self.end_game_dice {
            return false;
        }
        self.end_game_dice = dice;
        true
    }
}

/// Outnumbering bonus for the smaller side, if any.
pub fn outnumbering_bonus(side_a: usize, side_b: usize) -> Option<(Side, u32)> {
    let (small_side, small, large) = match side_a.cmp(&side_b) {
        Ordering::Less => (Side::SideA, side_a, side_b),
        Ordering::Greater => (Side::SideB, side_b, side_a),
        Ordering::Equal => return None,
    };
    if small == 0 {
        return None;
    }
    let ratio = large as f64 / small as f64;
    if ratio >= OUTNUMBERED_MAJOR_RATIO {
        Some((small_side, OUTNUMBERED_MAJOR_VP))
    } else if ratio >= OUTNUMBERED_MINOR_RATIO {
        Some((small_side, OUTNUMBERED_MINOR_VP))
    } else {
        None
    }
}

/// VP earned for holding more RP than the opponent.
pub fn resource_vp(mine: u32, theirs: u32) -> u32 {
    if mine <= theirs {
        return 0;
    }
    if mine >= theirs.saturating_mul(RP_DOMINANCE_RATIO) && mine - theirs >= RP_DOMINANCE_MARGIN {
        RP_DOMINANCE_VP
    } else {
        RP_ADVANTAGE_VP
    }
}

/// Score the mission. `ordered` holds each side's count of models still in
/// action and neither Disordered nor Panicked.
pub fn final_result(
    state: &VictoryState,
    ordered: [usize; 2],
    turn: u32,
    reason: Option<EndReason>,
) -> MissionResult {
    let mut breakdown = [VpBreakdown::default(); 2];
    for side in Side::BOTH {
        let i = slot(side);
        let mine = &state.scores[i];
        let theirs = &state.scores[slot(side.opponent())];
        breakdown[i].accrued = mine.vp;
        breakdown[i].resource = resource_vp(mine.rp, theirs.rp);
        if mine.eliminated_bp > theirs.eliminated_bp {
            breakdown[i].elimination = ELIMINATION_VP;
        }
        let opponent_bottled = theirs.bottled_out || ordered[slot(side.opponent())] == 0;
        if opponent_bottled {
            breakdown[i].bottled_out_bonus = BOTTLED_OUT_VP;
        }
    }

    let (a, b) = (breakdown[0].total(), breakdown[1].total());
    let (rp_a, rp_b) = (state.scores[0].rp, state.scores[1].rp);
    let winner = match a.cmp(&b).then(rp_a.cmp(&rp_b)) {
        Ordering::Greater => Some(Side::SideA),
        Ordering::Less => Some(Side::SideB),
        Ordering::Equal => None,
    };

    MissionResult {
        winner,
        side_a: breakdown[0],
        side_b: breakdown[1],
        rp: (rp_a, rp_b),
        turn,
        reason,
    }
}
