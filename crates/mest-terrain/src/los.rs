//! Line-of-sight between two models.
//!
//! Eye points sit at half model height plus the stacked hill elevation under
//! the model. Pairs within [`LOS_AUTO_RANGE_MU`] always see each other;
//! beyond that the eye-to-eye segment is tested against every terrain volume
//! and the nearest blocking hit wins.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use mest_core::constants::LOS_AUTO_RANGE_MU;
use mest_core::enums::TerrainKind;
use mest_core::types::{Position, TerrainId};

use crate::bounds::TerrainBounds;
use crate::map::TerrainMap;

/// What the LOS engine needs to know about a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    pub position: Position,
    pub height: f64,
}

impl Viewer {
    pub fn new(position: Position, height: f64) -> Self {
        Self { position, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LosResult {
    pub has_los: bool,
    /// Eye-to-eye distance (MU).
    pub distance: f64,
    pub blocked_by: Option<TerrainKind>,
    pub blocker: Option<TerrainId>,
}

pub fn eye_position(map: &TerrainMap, viewer: &Viewer) -> DVec3 {
    let ground = map.elevation_at(&viewer.position);
    viewer
        .position
        .to_dvec2()
        .extend(ground + viewer.height / 2.0)
}

/// Every volume crossed by the segment, nearest first.
pub fn ray_hits(map: &TerrainMap, from: DVec3, to: DVec3) -> Vec<(f64, &TerrainBounds)> {
    let dir = to - from;
    let mut hits: Vec<(f64, &TerrainBounds)> = map
        .bounds()
        .iter()
        .filter_map(|b| b.volume.ray_hit(from, dir).map(|t| (t, b)))
        .collect();
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits
}

pub fn validate_los(map: &TerrainMap, a: &Viewer, b: &Viewer) -> LosResult {
    let from = eye_position(map, a);
    let to = eye_position(map, b);
    let distance = from.distance(to);

    let clear = LosResult {
        has_los: true,
        distance,
        blocked_by: None,
        blocker: None,
    };
    if distance <= LOS_AUTO_RANGE_MU {
        return clear;
    }

    match ray_hits(map, from, to).into_iter().find(|(_, b)| b.blocking) {
        Some((_, bounds)) => LosResult {
            has_los: false,
            blocked_by: Some(bounds.kind),
            blocker: Some(bounds.id),
            ..clear
        },
        None => clear,
    }
}

pub fn has_line_of_sight(map: &TerrainMap, a: &Viewer, b: &Viewer) -> bool {
    validate_los(map, a, b).has_los
}

#[cfg(test)]
mod tests {
    use super::*;
    use mest_core::enums::HillSize;
    use mest_core::mission::TerrainEntry;

    fn at(x: f64, y: f64) -> Viewer {
        Viewer::new(Position::new(x, y), 2.0)
    }

    #[test]
    fn test_los_clear_on_open_ground() {
        let map = TerrainMap::default();
        let result = validate_los(&map, &at(0.0, -10.0), &at(0.0, 10.0));
        assert!(result.has_los);
        assert!((result.distance - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_building_blocks_hill_never_does() {
        let (a, b) = (at(0.0, -10.0), at(0.0, 10.0));

        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::Building, 0.0, 0.0))
            .unwrap();
        let result = validate_los(&map, &a, &b);
        assert!(!result.has_los);
        assert_eq!(result.blocked_by, Some(TerrainKind::Building));

        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::Hill, 0.0, 0.0).with_size(HillSize::Large))
            .unwrap();
        assert!(has_line_of_sight(&map, &a, &b));
    }

    #[test]
    fn test_short_range_ignores_terrain() {
        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::Building, 0.0, 0.0))
            .unwrap();
        for dy in [2.0, 3.0, 4.0] {
            assert!(has_line_of_sight(&map, &at(0.0, -dy), &at(0.0, dy)));
        }
        assert!(!has_line_of_sight(&map, &at(0.0, -4.5), &at(0.0, 4.5)));
    }

    #[test]
    fn test_trees_block() {
        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::TreeSingle, 0.0, 0.0))
            .unwrap();
        let result = validate_los(&map, &at(0.0, -10.0), &at(0.0, 10.0));
        assert_eq!(result.blocked_by, Some(TerrainKind::TreeSingle));
    }

    #[test]
    fn test_debris_does_not_block() {
        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::Debris, 0.0, 0.0))
            .unwrap();
        assert!(has_line_of_sight(&map, &at(0.0, -10.0), &at(0.0, 10.0)));
    }

    #[test]
    fn test_elevation_sees_over_nearby_wall() {
        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::Wall, 0.0, -4.0))
            .unwrap();
        let target = at(0.0, 10.0);
        assert!(!has_line_of_sight(&map, &at(0.0, -16.0), &target));

        map.place(&TerrainEntry::new(TerrainKind::Hill, 0.0, -16.0).with_size(HillSize::Large))
            .unwrap();
        let viewer = at(0.0, -16.0);
        assert_eq!(eye_position(&map, &viewer).z, 4.0);
        assert!(has_line_of_sight(&map, &viewer, &target));
    }

    #[test]
    fn test_nearest_blocker_reported() {
        let mut map = TerrainMap::default();
        let wall = map
            .place(&TerrainEntry::new(TerrainKind::Wall, 0.0, -6.0))
            .unwrap();
        map.place(&TerrainEntry::new(TerrainKind::Building, 0.0, 6.0))
            .unwrap();
        let result = validate_los(&map, &at(0.0, -12.0), &at(0.0, 12.0));
        assert_eq!(result.blocker, Some(wall));
        assert_eq!(result.blocked_by, Some(TerrainKind::Wall));
    }
}
