//! Bounding volumes for LOS ray tests.
//!
//! Rays are parametrised as `origin + t * dir` with `t` in `[0, 1]`, so `dir`
//! is the full eye-to-eye segment and hit parameters scale with distance.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use mest_core::constants::{DEBRIS_HEIGHT_MU, TREE_VOLUME_CENTER_Z};
use mest_core::enums::TerrainKind;
use mest_core::types::TerrainId;

use crate::object::{TerrainFeature, TerrainObject};

const EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingVolume {
    /// Axis-aligned box around the rotated corners of a structure.
    Aabb { min: DVec3, max: DVec3 },
    /// Vertical cylinder. Infinite `bottom`/`top` make it an XY-only test.
    Cylinder {
        center: DVec2,
        radius: f64,
        bottom: f64,
        top: f64,
    },
    Sphere { center: DVec3, radius: f64 },
}

impl BoundingVolume {
    /// Parameter interval of the segment lying inside the volume, clipped to `[0, 1]`.
    pub fn ray_interval(&self, origin: DVec3, dir: DVec3) -> Option<(f64, f64)> {
        let (t0, t1) = match *self {
            BoundingVolume::Aabb { min, max } => slab(origin, dir, min, max)?,
            BoundingVolume::Cylinder {
                center,
                radius,
                bottom,
                top,
            } => {
                let (a0, a1) = circle(origin.truncate() - center, dir.truncate(), radius)?;
                let (b0, b1) = axis_range(origin.z, dir.z, bottom, top)?;
                (a0.max(b0), a1.min(b1))
            }
            BoundingVolume::Sphere { center, radius } => {
                quadratic(origin - center, dir, radius)?
            }
        };
        let (t0, t1) = (t0.max(0.0), t1.min(1.0));
        (t0 <= t1).then_some((t0, t1))
    }

    /// Entry parameter of the first hit, if any.
    pub fn ray_hit(&self, origin: DVec3, dir: DVec3) -> Option<f64> {
        self.ray_interval(origin, dir).map(|(t0, _)| t0)
    }
}

/// Slab method over all three axes.
fn slab(origin: DVec3, dir: DVec3, min: DVec3, max: DVec3) -> Option<(f64, f64)> {
    let mut t0 = f64::NEG_INFINITY;
    let mut t1 = f64::INFINITY;
    for axis in 0..3 {
        let (a, b) = axis_range(origin[axis], dir[axis], min[axis], max[axis])?;
        t0 = t0.max(a);
        t1 = t1.min(b);
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Interval along one axis for which `lo <= o + t*d <= hi`.
fn axis_range(o: f64, d: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if d.abs() < EPS {
        return (lo <= o && o <= hi).then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let a = (lo - o) / d;
    let b = (hi - o) / d;
    Some((a.min(b), a.max(b)))
}

fn circle(rel: DVec2, dir: DVec2, radius: f64) -> Option<(f64, f64)> {
    let a = dir.length_squared();
    if a < EPS {
        return (rel.length_squared() <= radius * radius)
            .then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    solve(a, 2.0 * rel.dot(dir), rel.length_squared() - radius * radius)
}

fn quadratic(rel: DVec3, dir: DVec3, radius: f64) -> Option<(f64, f64)> {
    let a = dir.length_squared();
    if a < EPS {
        return (rel.length_squared() <= radius * radius)
            .then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    solve(a, 2.0 * rel.dot(dir), rel.length_squared() - radius * radius)
}

fn solve(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    Some(((-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)))
}

/// Precomputed LOS volume for one terrain object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainBounds {
    pub id: TerrainId,
    pub kind: TerrainKind,
    pub blocking: bool,
    pub volume: BoundingVolume,
}

impl TerrainBounds {
    /// Volume for `obj` standing on ground at `base` elevation.
    pub fn from_object(obj: &TerrainObject, base: f64) -> Self {
        let center = obj.position.to_dvec2();
        let volume = match &obj.feature {
            TerrainFeature::Building(s) | TerrainFeature::Wall(s) => {
                let corners = obj.corners().unwrap_or([center; 4]);
                let lo = corners.iter().fold(DVec2::splat(f64::INFINITY), |m, c| m.min(*c));
                let hi = corners.iter().fold(DVec2::splat(f64::NEG_INFINITY), |m, c| m.max(*c));
                BoundingVolume::Aabb {
                    min: lo.extend(base),
                    max: hi.extend(base + s.height),
                }
            }
            TerrainFeature::Hill(hill) => BoundingVolume::Cylinder {
                center,
                radius: hill.total_radius,
                bottom: f64::NEG_INFINITY,
                top: f64::INFINITY,
            },
            TerrainFeature::TreeSingle | TerrainFeature::TreeCluster | TerrainFeature::TreeStand => {
                BoundingVolume::Sphere {
                    center: center.extend(base + TREE_VOLUME_CENTER_Z),
                    radius: obj.footprint_radius(),
                }
            }
            TerrainFeature::Debris { radius } => BoundingVolume::Cylinder {
                center,
                radius: *radius,
                bottom: base,
                top: base + DEBRIS_HEIGHT_MU,
            },
        };
        Self {
            id: obj.id,
            kind: obj.kind(),
            blocking: obj.blocks_los(),
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slab_hit_and_miss() {
        let aabb = BoundingVolume::Aabb {
            min: DVec3::new(-1.0, -1.0, 0.0),
            max: DVec3::new(1.0, 1.0, 2.0),
        };
        let origin = DVec3::new(0.0, -10.0, 1.0);
        let t = aabb.ray_hit(origin, DVec3::new(0.0, 20.0, 0.0)).unwrap();
        assert!((t - 0.45).abs() < 1e-12);
        // Passes over the top.
        assert!(aabb
            .ray_hit(DVec3::new(0.0, -10.0, 3.0), DVec3::new(0.0, 20.0, 0.0))
            .is_none());
        // Stops short of the box.
        assert!(aabb.ray_hit(origin, DVec3::new(0.0, 5.0, 0.0)).is_none());
    }

    #[test]
    fn test_cylinder_ignores_height_when_unbounded() {
        let hill = BoundingVolume::Cylinder {
            center: DVec2::ZERO,
            radius: 2.0,
            bottom: f64::NEG_INFINITY,
            top: f64::INFINITY,
        };
        let hit = hill.ray_interval(DVec3::new(-10.0, 0.0, 50.0), DVec3::new(20.0, 0.0, 0.0));
        let (t0, t1) = hit.unwrap();
        assert!((t0 - 0.4).abs() < 1e-12 && (t1 - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_low_cylinder_clipped_by_height() {
        let debris = BoundingVolume::Cylinder {
            center: DVec2::ZERO,
            radius: 1.5,
            bottom: 0.0,
            top: 0.5,
        };
        let dir = DVec3::new(20.0, 0.0, 0.0);
        assert!(debris.ray_hit(DVec3::new(-10.0, 0.0, 1.0), dir).is_none());
        assert!(debris.ray_hit(DVec3::new(-10.0, 0.0, 0.25), dir).is_some());
    }

    #[test]
    fn test_sphere_hit() {
        let tree = BoundingVolume::Sphere {
            center: DVec3::new(0.0, 0.0, 1.0),
            radius: 0.5,
        };
        let dir = DVec3::new(0.0, 20.0, 0.0);
        assert!(tree.ray_hit(DVec3::new(0.0, -10.0, 1.0), dir).is_some());
        assert!(tree.ray_hit(DVec3::new(0.6, -10.0, 1.0), dir).is_none());
    }
}
