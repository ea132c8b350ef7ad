//! Fundamental geometric and identity types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position on the battlefield plane (Map Units).
/// The battlefield is a square centered at the origin.
/// x = East, y = North; side A deploys south of the center line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in MU.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point at `radius` MU from this one along `angle` (radians, 0 = East, counter-clockwise).
    pub fn offset(&self, angle: f64, radius: f64) -> Position {
        Position::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    /// Linear interpolation toward `other` (t = 0 → self, t = 1 → other).
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl From<DVec2> for Position {
    fn from(v: DVec2) -> Self {
        Position::new(v.x, v.y)
    }
}

/// Stable model identity within a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u32);

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model-{}", self.0)
    }
}

/// Stable terrain identity within a battlefield session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(pub u32);

impl std::fmt::Display for TerrainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "terrain-{}", self.0)
    }
}

/// Square battlefield dimensions, centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattlefieldSize {
    /// Side length in MU.
    pub side: f64,
}

impl BattlefieldSize {
    pub fn new(side: f64) -> Self {
        Self { side }
    }

    pub fn half(&self) -> f64 {
        self.side / 2.0
    }

    /// Whether the point lies on the playable surface (edges inclusive).
    pub fn contains(&self, pos: &Position) -> bool {
        let h = self.half();
        pos.x.abs() <= h && pos.y.abs() <= h
    }

    /// Nearest point on the playable surface.
    pub fn clamp(&self, pos: &Position) -> Position {
        let h = self.half();
        Position::new(pos.x.clamp(-h, h), pos.y.clamp(-h, h))
    }
}

impl Default for BattlefieldSize {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_BATTLEFIELD_MU)
    }
}
