//! Opposed 2d6 combat tests.
//!
//! Attacker rolls `2d6 + ability` (CCA for close combat, RCA for ranged);
//! the defender rolls `2d6 + reflexes + defensive bonus`. The attacker hits
//! on a total greater than or equal to the defender's.

use serde::{Deserialize, Serialize};

use mest_core::components::ModelProfile;
use mest_core::enums::CombatKind;

use crate::dice::DiceRoller;

/// Occurrences of each 2d6 total, indexed by total (0..=12).
const TWO_D6_WAYS: [u32; 13] = [0, 0, 1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1];

/// Modifiers of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatModifiers {
    pub attack: i32,
    pub defence: i32,
}

impl CombatModifiers {
    pub fn new(kind: CombatKind, attacker: &ModelProfile, defender: &ModelProfile, defensive_bonus: i32) -> Self {
        let attack = match kind {
            CombatKind::Close => attacker.cca,
            CombatKind::Ranged => attacker.rca,
        };
        Self {
            attack,
            defence: defender.reflexes + defensive_bonus,
        }
    }
}

/// Exact hit probability, enumerating all 36 × 36 dice outcomes.
pub fn hit_probability(mods: CombatModifiers) -> f64 {
    let mut hits = 0u32;
    for (a, &a_ways) in TWO_D6_WAYS.iter().enumerate().skip(2) {
        for (d, &d_ways) in TWO_D6_WAYS.iter().enumerate().skip(2) {
            if a as i32 + mods.attack >= d as i32 + mods.defence {
                hits += a_ways * d_ways;
            }
        }
    }
    hits as f64 / (36.0 * 36.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRoll {
    pub kind: CombatKind,
    pub attack_roll: u8,
    pub defence_roll: u8,
    pub attack_total: i32,
    pub defence_total: i32,
    pub hit: bool,
}

/// Roll one opposed test.
pub fn roll_combat(dice: &mut dyn DiceRoller, kind: CombatKind, mods: CombatModifiers) -> CombatRoll {
    let attack_roll = dice.roll_2d6();
    let defence_roll = dice.roll_2d6();
    let attack_total = attack_roll as i32 + mods.attack;
    let defence_total = defence_roll as i32 + mods.defence;
    CombatRoll {
        kind,
        attack_roll,
        defence_roll,
        attack_total,
        defence_total,
        hit: attack_total >= defence_total,
    }
}
