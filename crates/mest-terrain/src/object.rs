//! Terrain objects: a closed sum type over terrain kinds.
//!
//! Each object has exactly one footprint, shared by the placement validator,
//! the LOS bounding volumes and the movement-cost grid.

use glam::DVec2;

use mest_core::constants::*;
use mest_core::enums::{HillSize, TerrainKind};
use mest_core::mission::TerrainEntry;
use mest_core::state::TerrainView;
use mest_core::types::{Position, TerrainId};

/// Hill parameters. Invariant: `plateau_radius <= total_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hill {
    pub size: HillSize,
    pub total_radius: f64,
    pub plateau_radius: f64,
    /// Height of the plateau above the hill's base (MU).
    pub elevation: f64,
}

impl Hill {
    pub fn new(size: HillSize) -> Self {
        let (total_radius, plateau_radius, elevation) = match size {
            HillSize::Small => SMALL_HILL,
            HillSize::Medium => MEDIUM_HILL,
            HillSize::Large => LARGE_HILL,
        };
        Self {
            size,
            total_radius,
            plateau_radius,
            elevation,
        }
    }
}

/// Rectangular structure dimensions (building or wall).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Structure {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

/// Kind-specific terrain data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerrainFeature {
    Hill(Hill),
    TreeSingle,
    TreeCluster,
    TreeStand,
    Building(Structure),
    Wall(Structure),
    Debris { radius: f64 },
}

/// A placed terrain piece.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainObject {
    pub id: TerrainId,
    pub position: Position,
    /// Rotation in degrees, a multiple of 15 in `0..360`.
    pub rotation_deg: f64,
    pub feature: TerrainFeature,
}

/// Snap a rotation to the 15° grid and wrap into `0..360`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let snapped = (degrees / ROTATION_STEP_DEG).round() * ROTATION_STEP_DEG;
    snapped.rem_euclid(360.0)
}

impl TerrainObject {
    pub fn new(id: TerrainId, position: Position, rotation_deg: f64, feature: TerrainFeature) -> Self {
        Self {
            id,
            position,
            rotation_deg: normalize_rotation(rotation_deg),
            feature,
        }
    }

    /// Build an object from a wire-format entry, filling kind defaults.
    pub fn from_entry(id: TerrainId, entry: &TerrainEntry) -> Self {
        let structure = |w, d, h| Structure {
            width: entry.width.unwrap_or(w),
            depth: entry.depth.unwrap_or(d),
            height: entry.height.unwrap_or(h),
        };
        let feature = match entry.kind {
            TerrainKind::Hill => {
                let mut hill = Hill::new(entry.size.unwrap_or_default());
                if let Some(total) = entry.total_radius_mu {
                    hill.total_radius = total;
                }
                if let Some(plateau) = entry.plateau_radius_mu {
                    hill.plateau_radius = plateau;
                }
                if let Some(height) = entry.height {
                    hill.elevation = height;
                }
                hill.plateau_radius = hill.plateau_radius.min(hill.total_radius);
                TerrainFeature::Hill(hill)
            }
            TerrainKind::TreeSingle => TerrainFeature::TreeSingle,
            TerrainKind::TreeCluster => TerrainFeature::TreeCluster,
            TerrainKind::TreeStand => TerrainFeature::TreeStand,
            TerrainKind::Building => TerrainFeature::Building(structure(
                BUILDING_DEFAULT_WIDTH_MU,
                BUILDING_DEFAULT_DEPTH_MU,
                BUILDING_DEFAULT_HEIGHT_MU,
            )),
            TerrainKind::Wall => TerrainFeature::Wall(structure(
                WALL_DEFAULT_WIDTH_MU,
                WALL_DEFAULT_DEPTH_MU,
                WALL_DEFAULT_HEIGHT_MU,
            )),
            TerrainKind::Debris => TerrainFeature::Debris {
                radius: entry.radius.unwrap_or(DEBRIS_DEFAULT_RADIUS_MU),
            },
        };
        Self::new(
            id,
            Position::new(entry.x, entry.y),
            entry.rotation.unwrap_or(0.0),
            feature,
        )
    }

    pub fn kind(&self) -> TerrainKind {
        match self.feature {
            TerrainFeature::Hill(_) => TerrainKind::Hill,
            TerrainFeature::TreeSingle => TerrainKind::TreeSingle,
            TerrainFeature::TreeCluster => TerrainKind::TreeCluster,
            TerrainFeature::TreeStand => TerrainKind::TreeStand,
            TerrainFeature::Building(_) => TerrainKind::Building,
            TerrainFeature::Wall(_) => TerrainKind::Wall,
            TerrainFeature::Debris { .. } => TerrainKind::Debris,
        }
    }

    pub fn hill(&self) -> Option<&Hill> {
        match &self.feature {
            TerrainFeature::Hill(hill) => Some(hill),
            _ => None,
        }
    }

    pub fn structure(&self) -> Option<&Structure> {
        match &self.feature {
            TerrainFeature::Building(s) | TerrainFeature::Wall(s) => Some(s),
            _ => None,
        }
    }

    pub fn blocks_los(&self) -> bool {
        self.kind().blocks_los()
    }

    /// Circular collision footprint radius.
    pub fn footprint_radius(&self) -> f64 {
        match &self.feature {
            TerrainFeature::Hill(hill) => hill.total_radius,
            TerrainFeature::TreeSingle => TREE_SINGLE_RADIUS_MU,
            TerrainFeature::TreeCluster => TREE_CLUSTER_RADIUS_MU,
            TerrainFeature::TreeStand => TREE_STAND_RADIUS_MU,
            TerrainFeature::Building(s) | TerrainFeature::Wall(s) => s.width.max(s.depth) / 2.0,
            TerrainFeature::Debris { radius } => *radius,
        }
    }

    /// Physical height of the piece above its base (MU).
    pub fn height(&self) -> f64 {
        match &self.feature {
            TerrainFeature::Hill(hill) => hill.elevation,
            TerrainFeature::TreeSingle | TerrainFeature::TreeCluster | TerrainFeature::TreeStand => {
                TREE_VOLUME_CENTER_Z + self.footprint_radius()
            }
            TerrainFeature::Building(s) | TerrainFeature::Wall(s) => s.height,
            TerrainFeature::Debris { .. } => DEBRIS_HEIGHT_MU,
        }
    }

    /// Rectangle corners for structures, rotated about the center.
    pub fn corners(&self) -> Option<[DVec2; 4]> {
        let s = self.structure()?;
        let (hw, hd) = (s.width / 2.0, s.depth / 2.0);
        let rot = DVec2::from_angle(self.rotation_deg.to_radians());
        let center = self.position.to_dvec2();
        Some(
            [(-hw, -hd), (hw, -hd), (hw, hd), (-hw, hd)]
                .map(|(x, y)| center + rot.rotate(DVec2::new(x, y))),
        )
    }

    /// Whether a point lies inside the physical footprint.
    /// Structures use their rotated rectangle; everything else its circle.
    pub fn contains(&self, point: &Position) -> bool {
        if let Some(s) = self.structure() {
            let rot = DVec2::from_angle(-self.rotation_deg.to_radians());
            let local = rot.rotate(point.to_dvec2() - self.position.to_dvec2());
            return local.x.abs() <= s.width / 2.0 && local.y.abs() <= s.depth / 2.0;
        }
        self.position.distance_to(point) <= self.footprint_radius()
    }

    /// Whether a point stands on this hill's plateau.
    pub fn on_plateau(&self, point: &Position) -> bool {
        self.hill()
            .is_some_and(|hill| self.position.distance_to(point) <= hill.plateau_radius)
    }

    pub fn view(&self) -> TerrainView {
        TerrainView {
            id: self.id,
            kind: self.kind(),
            position: self.position,
            rotation_deg: self.rotation_deg,
            footprint_radius: self.footprint_radius(),
            extent: self.structure().map(|s| (s.width, s.depth)),
            height: self.height(),
            blocking: self.blocks_los(),
            plateau: self.hill().map(|h| (h.plateau_radius, h.elevation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_snaps_to_steps() {
        assert_eq!(normalize_rotation(44.0), 45.0);
        assert_eq!(normalize_rotation(-15.0), 345.0);
        assert_eq!(normalize_rotation(360.0), 0.0);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
    }

    #[test]
    fn test_footprint_radii_by_kind() {
        let at = |kind| TerrainObject::from_entry(TerrainId(0), &TerrainEntry::new(kind, 0.0, 0.0));
        assert_eq!(at(TerrainKind::TreeSingle).footprint_radius(), 0.5);
        assert_eq!(at(TerrainKind::TreeCluster).footprint_radius(), 3.0);
        assert_eq!(at(TerrainKind::TreeStand).footprint_radius(), 6.0);
        assert_eq!(at(TerrainKind::Building).footprint_radius(), 3.0);
        assert_eq!(at(TerrainKind::Wall).footprint_radius(), 3.0);
        assert_eq!(at(TerrainKind::Hill).footprint_radius(), MEDIUM_HILL.0);
    }

    #[test]
    fn test_hill_overrides_clamp_plateau() {
        let mut entry = TerrainEntry::new(TerrainKind::Hill, 0.0, 0.0).with_size(HillSize::Small);
        entry.total_radius_mu = Some(4.0);
        entry.plateau_radius_mu = Some(9.0);
        let obj = TerrainObject::from_entry(TerrainId(1), &entry);
        let hill = obj.hill().unwrap();
        assert_eq!(hill.total_radius, 4.0);
        assert_eq!(hill.plateau_radius, 4.0);
        assert_eq!(hill.size, HillSize::Small);
    }

    #[test]
    fn test_rotated_structure_contains() {
        let entry = TerrainEntry::new(TerrainKind::Wall, 0.0, 0.0).with_rotation(90.0);
        let wall = TerrainObject::from_entry(TerrainId(2), &entry);
        // Rotated 90°: the 6 MU length now runs north-south.
        assert!(wall.contains(&Position::new(0.0, 2.9)));
        assert!(!wall.contains(&Position::new(2.9, 0.0)));
        let corners = wall.corners().unwrap();
        assert!(corners.iter().all(|c| c.y.abs() <= 3.0 + 1e-9));
    }
}
