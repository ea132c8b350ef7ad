//! TerrainMap: the terrain list and its LOS bounds.
//!
//! Every mutation recomputes bounds before returning. `revision` counts
//! mutations and `bounds_revision` the revision the bounds were built for;
//! reading bounds while they differ is an invariant violation.

use tracing::debug;

use mest_core::error::PlacementError;
use mest_core::mission::TerrainEntry;
use mest_core::state::TerrainView;
use mest_core::types::{BattlefieldSize, Position, TerrainId};

use crate::bounds::TerrainBounds;
use crate::object::TerrainObject;
use crate::placement;

#[derive(Debug, Clone)]
pub struct TerrainMap {
    size: BattlefieldSize,
    objects: Vec<TerrainObject>,
    bounds: Vec<TerrainBounds>,
    next_id: u32,
    revision: u64,
    bounds_revision: u64,
}

impl Default for TerrainMap {
    fn default() -> Self {
        Self::new(BattlefieldSize::default())
    }
}

impl TerrainMap {
    pub fn new(size: BattlefieldSize) -> Self {
        Self {
            size,
            objects: Vec::new(),
            bounds: Vec::new(),
            next_id: 1,
            revision: 0,
            bounds_revision: 0,
        }
    }

    pub fn size(&self) -> BattlefieldSize {
        self.size
    }

    pub fn objects(&self) -> &[TerrainObject] {
        &self.objects
    }

    pub fn get(&self, id: TerrainId) -> Option<&TerrainObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The object `entry` would become if placed now.
    pub fn candidate(&self, entry: &TerrainEntry) -> TerrainObject {
        TerrainObject::from_entry(TerrainId(self.next_id), entry)
    }

    /// Check a placement without mutating anything.
    pub fn validate(&self, candidate: &TerrainObject) -> Result<(), PlacementError> {
        placement::is_valid_placement(candidate, &self.objects, self.size)
    }

    /// Validate and insert a piece. Ids are only consumed on success.
    pub fn place(&mut self, entry: &TerrainEntry) -> Result<TerrainId, PlacementError> {
        let candidate = self.candidate(entry);
        if let Err(reason) = self.validate(&candidate) {
            debug!(kind = ?entry.kind, x = entry.x, y = entry.y, reason = reason.reason(), "placement rejected");
            return Err(reason);
        }
        let id = candidate.id;
        self.next_id += 1;
        self.objects.push(candidate);
        self.touch();
        Ok(id)
    }

    pub fn remove(&mut self, id: TerrainId) -> Option<TerrainObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        let removed = self.objects.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.touch();
    }

    /// Clear everything and switch to a new battlefield size.
    pub fn reset(&mut self, size: BattlefieldSize) {
        self.size = size;
        self.next_id = 1;
        self.clear();
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.refresh_bounds();
    }

    /// Recompute every LOS volume against the current terrain list.
    pub fn refresh_bounds(&mut self) {
        let bounds: Vec<TerrainBounds> = self
            .objects
            .iter()
            .map(|obj| TerrainBounds::from_object(obj, self.base_elevation(obj)))
            .collect();
        self.bounds = bounds;
        self.bounds_revision = self.revision;
    }

    /// LOS volumes. Panics if terrain changed since the last refresh.
    pub fn bounds(&self) -> &[TerrainBounds] {
        assert_eq!(
            self.revision, self.bounds_revision,
            "terrain bounds queried while stale"
        );
        &self.bounds
    }

    /// Ground height at a point: the sum of every hill plateau containing it.
    /// Hills are either nested or disjoint, so the sum is the stacked height.
    pub fn elevation_at(&self, point: &Position) -> f64 {
        self.objects
            .iter()
            .filter(|o| o.on_plateau(point))
            .filter_map(|o| o.hill().map(|h| h.elevation))
            .sum()
    }

    /// Elevation an object stands on, excluding its own contribution.
    fn base_elevation(&self, obj: &TerrainObject) -> f64 {
        self.objects
            .iter()
            .filter(|o| o.id != obj.id && o.on_plateau(&obj.position))
            .filter_map(|o| o.hill().map(|h| h.elevation))
            .sum()
    }

    /// Objects whose footprint contains the point.
    pub fn objects_at<'a>(&'a self, point: &'a Position) -> impl Iterator<Item = &'a TerrainObject> + 'a {
        self.objects.iter().filter(move |o| o.contains(point))
    }

    pub fn views(&self) -> Vec<TerrainView> {
        self.objects.iter().map(TerrainObject::view).collect()
    }
}
