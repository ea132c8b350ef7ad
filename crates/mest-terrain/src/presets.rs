//! Named terrain layouts for the default 48 MU battlefield.
//!
//! Every layout places cleanly on an empty 48×48 table. On smaller tables
//! pieces that no longer fit are rejected by the normal placement rules.

use mest_core::enums::{HillSize, TerrainKind};
use mest_core::error::MissionError;
use mest_core::mission::TerrainEntry;

pub const PRESET_NAMES: [&str; 5] = ["open", "standard", "urban", "forest", "hills"];

fn piece(kind: TerrainKind, x: f64, y: f64) -> TerrainEntry {
    TerrainEntry::new(kind, x, y)
}

fn hill(size: HillSize, x: f64, y: f64) -> TerrainEntry {
    TerrainEntry::new(TerrainKind::Hill, x, y).with_size(size)
}

/// Entries for a named preset, in placement order.
pub fn preset_layout(name: &str) -> Result<Vec<TerrainEntry>, MissionError> {
    use TerrainKind::*;
    let layout = match name.trim().to_ascii_lowercase().as_str() {
        "open" => vec![],
        "standard" => vec![
            hill(HillSize::Large, -12.0, 0.0),
            hill(HillSize::Medium, 12.0, 6.0),
            piece(TreeSingle, -12.0, 2.0),
            piece(Building, 0.0, 14.0),
            piece(Building, 0.0, -14.0).with_rotation(90.0),
            piece(Wall, 14.0, -10.0).with_rotation(45.0),
            piece(Wall, -14.0, 12.0),
            piece(TreeCluster, 6.0, -4.0),
            piece(TreeStand, -16.0, -14.0),
            piece(Debris, 6.0, 18.0),
        ],
        "urban" => vec![
            piece(Building, -12.0, -12.0),
            piece(Building, 12.0, -12.0).with_rotation(90.0),
            piece(Building, -12.0, 12.0).with_rotation(90.0),
            piece(Building, 12.0, 12.0),
            piece(Wall, 0.0, -6.0),
            piece(Wall, 0.0, 6.0),
            piece(Debris, 0.0, 0.0),
            piece(Debris, -6.0, 0.0),
            piece(Debris, 6.0, 0.0),
            piece(TreeSingle, 0.0, 18.0),
        ],
        "forest" => vec![
            piece(TreeStand, -12.0, -10.0),
            piece(TreeStand, 12.0, 10.0),
            piece(TreeCluster, -10.0, 12.0),
            piece(TreeCluster, 10.0, -12.0),
            piece(TreeCluster, 0.0, 0.0),
            hill(HillSize::Small, 16.0, -2.0),
            piece(TreeSingle, -2.0, 16.0),
            piece(Debris, 4.0, -4.0),
        ],
        "hills" => vec![
            hill(HillSize::Large, 0.0, 0.0),
            hill(HillSize::Small, 2.0, 0.0),
            hill(HillSize::Medium, -16.0, 12.0),
            hill(HillSize::Medium, 16.0, -12.0),
            piece(TreeSingle, -16.0, 12.0),
            piece(Wall, 0.0, 18.0),
        ],
        _ => return Err(MissionError::UnknownPreset(name.to_string())),
    };
    Ok(layout)
}
