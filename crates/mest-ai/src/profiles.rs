//! AI personality profiles.
//!
//! Consolidates the heuristic weights the action scorer applies per profile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiProfileKind {
    #[default]
    Balanced,
    Aggressive,
    Cautious,
}

impl AiProfileKind {
    pub const ALL: [AiProfileKind; 3] = [
        AiProfileKind::Balanced,
        AiProfileKind::Aggressive,
        AiProfileKind::Cautious,
    ];

    /// Parse a mission `aiProfile` string. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "balanced" | "default" => Some(AiProfileKind::Balanced),
            "aggressive" => Some(AiProfileKind::Aggressive),
            "cautious" | "defensive" => Some(AiProfileKind::Cautious),
            _ => None,
        }
    }
}

/// Heuristic weights for one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiProfile {
    pub kind: AiProfileKind,
    /// Multiplies the simulated hit probability of an attack.
    pub attack_weight: f64,
    /// Ranged attacks are scaled relative to close combat.
    pub ranged_factor: f64,
    /// Per MU of distance closed toward the nearest enemy.
    pub advance_weight: f64,
    /// Per point of defensive bonus at the destination.
    pub cover_weight: f64,
    /// Base value of hiding while an enemy is visible.
    pub hide_weight: f64,
    /// Flat value of waiting.
    pub wait_weight: f64,
}

/// Get the weights for a given profile.
pub fn get_profile(kind: AiProfileKind) -> AiProfile {
    match kind {
        AiProfileKind::Balanced => AiProfile {
            kind,
            attack_weight: 10.0,
            ranged_factor: 0.9,
            advance_weight: 0.75,
            cover_weight: 1.5,
            hide_weight: 2.0,
            wait_weight: 0.5,
        },
        AiProfileKind::Aggressive => AiProfile {
            kind,
            attack_weight: 14.0,
            ranged_factor: 0.8,
            advance_weight: 1.25,
            cover_weight: 0.5,
            hide_weight: 0.5,
            wait_weight: 0.0,
        },
        AiProfileKind::Cautious => AiProfile {
            kind,
            attack_weight: 7.0,
            ranged_factor: 1.0,
            advance_weight: 0.3,
            cover_weight: 3.0,
            hide_weight: 3.0,
            wait_weight: 1.0,
        },
    }
}
