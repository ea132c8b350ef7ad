//! Dice sources.
//!
//! The battlefield rolls through a [`DiceRoller`] so that the seeded RNG can
//! be swapped for a scripted sequence in scenario tests.

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Source of six-sided dice.
pub trait DiceRoller {
    /// One die, `1..=6`.
    fn roll_d6(&mut self) -> u8;

    fn roll_2d6(&mut self) -> u8 {
        self.roll_d6() + self.roll_d6()
    }
}

impl DiceRoller for ChaCha8Rng {
    fn roll_d6(&mut self) -> u8 {
        self.gen_range(1..=6)
    }
}

/// Replays a fixed sequence of rolls, then keeps returning `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
    fallback: u8,
}

impl ScriptedDice {
    /// Once exhausted, every further roll is a 6.
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self::with_fallback(rolls, 6)
    }

    pub fn with_fallback(rolls: impl IntoIterator<Item = u8>, fallback: u8) -> Self {
        Self {
            rolls: rolls.into_iter().map(|r| r.clamp(1, 6)).collect(),
            fallback: fallback.clamp(1, 6),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_d6(&mut self) -> u8 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}
