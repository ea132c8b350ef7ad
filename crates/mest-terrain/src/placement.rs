//! Collision and placement validation for terrain pieces.
//!
//! Footprints are circles (see [`TerrainObject::footprint_radius`]). A
//! candidate may hang off the table edge as long as part of it remains on
//! the battlefield. Overlapping pairs are judged by ordered rules; the first
//! failing pair decides the rejection reason.

use std::f64::consts::TAU;

use mest_core::constants::{SAMPLE_RING_ANGLES, SAMPLE_RING_STEP_MU};
use mest_core::enums::TerrainKind;
use mest_core::error::PlacementError;
use mest_core::types::{BattlefieldSize, Position};

use crate::object::TerrainObject;

/// Validate a candidate against existing terrain and the battlefield bounds.
pub fn is_valid_placement(
    candidate: &TerrainObject,
    existing: &[TerrainObject],
    size: BattlefieldSize,
) -> Result<(), PlacementError> {
    if !footprint_touches_battlefield(candidate, size) {
        return Err(PlacementError::OutsideBounds);
    }

    let r1 = candidate.footprint_radius();
    for other in existing.iter().filter(|o| o.id != candidate.id) {
        let distance = candidate.position.distance_to(&other.position);
        if distance < r1 + other.footprint_radius() {
            pair_rule(candidate, other)?;
        }
    }
    Ok(())
}

/// True if any part of the footprint circle overlaps the battlefield square.
pub fn footprint_touches_battlefield(obj: &TerrainObject, size: BattlefieldSize) -> bool {
    let nearest = size.clamp(&obj.position);
    nearest.distance_to(&obj.position) < obj.footprint_radius() || size.contains(&obj.position)
}

/// Placement rule for an intersecting pair, candidate first.
pub fn pair_rule(candidate: &TerrainObject, existing: &TerrainObject) -> Result<(), PlacementError> {
    let (a, b) = (candidate.kind(), existing.kind());
    let distance = candidate.position.distance_to(&existing.position);

    // 1. Hill on hill: strictly smaller and fully on the outer plateau.
    if let (Some(inner), Some(outer)) = (candidate.hill(), existing.hill()) {
        let fits = distance <= outer.plateau_radius - inner.total_radius;
        return if inner.size < outer.size && fits {
            Ok(())
        } else {
            Err(PlacementError::HillStackingViolation {
                existing: existing.id,
            })
        };
    }

    // 2. Tree and hill, either way round: the tree sits on the plateau.
    let tree_on_hill = match (candidate.hill(), existing.hill()) {
        (None, Some(_)) if a.is_tree() => Some((candidate, existing)),
        (Some(_), None) if b.is_tree() => Some((existing, candidate)),
        _ => None,
    };
    if let Some((tree, hill)) = tree_on_hill {
        return if hill.on_plateau(&tree.position) {
            Ok(())
        } else {
            Err(PlacementError::NotOnHillPlateau {
                existing: existing.id,
            })
        };
    }

    // 3. Structures never overlap each other.
    if a.is_structure() && b.is_structure() {
        return Err(PlacementError::BuildingWallIntersection {
            existing: existing.id,
        });
    }

    // 4. Trees and hills never overlap structures.
    let natural = |k: TerrainKind| k.is_tree() || k == TerrainKind::Hill;
    if (natural(a) && b.is_structure()) || (a.is_structure() && natural(b)) {
        return Err(PlacementError::TerrainBuildingIntersection {
            existing: existing.id,
        });
    }

    Ok(())
}

/// Nearest valid spot for `candidate`, searching rings around its position.
///
/// Sampling approximation: rings every [`SAMPLE_RING_STEP_MU`] out to half the
/// battlefield, [`SAMPLE_RING_ANGLES`] samples each, first hit wins.
pub fn find_closest_valid_placement(
    candidate: &TerrainObject,
    existing: &[TerrainObject],
    size: BattlefieldSize,
) -> Option<Position> {
    if is_valid_placement(candidate, existing, size).is_ok() {
        return Some(candidate.position);
    }
    let mut probe = candidate.clone();
    let rings = (size.half() / SAMPLE_RING_STEP_MU).ceil() as u32;
    for ring in 1..=rings {
        let radius = ring as f64 * SAMPLE_RING_STEP_MU;
        for step in 0..SAMPLE_RING_ANGLES {
            let angle = TAU * step as f64 / SAMPLE_RING_ANGLES as f64;
            probe.position = candidate.position.offset(angle, radius);
            if is_valid_placement(&probe, existing, size).is_ok() {
                return Some(probe.position);
            }
        }
    }
    None
}
