//! Tactical AI for the MEST QSR rules engine.
//!
//! Enumerates candidate actions for a model, scores them with profile-weighted
//! heuristics and simulated combat, and picks the best one.

pub mod profiles;
pub mod scorer;

pub use mest_core as core;
pub use profiles::{get_profile, AiProfile, AiProfileKind};
pub use scorer::{decide_action, enumerate_actions, ActionCandidate, ActionKind, TacticalView, UnitView};

#[cfg(test)]
mod tests;
