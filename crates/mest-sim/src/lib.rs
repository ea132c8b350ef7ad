//! Rules engine session for MEST QSR.
//!
//! Owns the model roster (a hecs world), token and hindrance ledgers,
//! objectives, end-game and victory scoring, and exposes the battlefield
//! command/query API.

pub mod combat;
pub mod cover;
pub mod dice;
pub mod engine;
pub mod hindrance;
pub mod objectives;
pub mod roster;
pub mod snapshot;
pub mod tokens;
pub mod victory;
pub mod world_setup;

pub use engine::{Battlefield, MoveOutcome, SimConfig};
pub use mest_core as core;
pub use dice::{DiceRoller, ScriptedDice};

#[cfg(test)]
mod tests;
