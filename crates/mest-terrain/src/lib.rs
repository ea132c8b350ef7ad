//! Terrain system for the MEST QSR rules engine.
//!
//! Terrain objects and placement rules, LOS bounding volumes,
//! line-of-sight queries, movement costs and pathfinding.

pub use mest_core as core;

pub mod bounds;
pub mod grid;
pub mod los;
pub mod map;
pub mod object;
pub mod pathfinding;
pub mod placement;
pub mod presets;

// Re-export key types for convenience.
pub use grid::{CostGrid, CostTable};
pub use los::{has_line_of_sight, validate_los, LosResult, Viewer};
pub use map::TerrainMap;
pub use object::{TerrainFeature, TerrainObject};
pub use pathfinding::{PathResult, Pathfinder};
pub use placement::is_valid_placement;
