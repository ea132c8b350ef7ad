//! Movement-cost table and the uniform cost grid used by path search.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use mest_core::constants::{
    DIFFICULT_COST_PER_MU, HILL_COST_PER_MU, OPEN_COST_PER_MU, PATH_GRID_CELL_MU,
};
use mest_core::enums::TerrainKind;
use mest_core::types::Position;

use crate::map::TerrainMap;
use crate::object::TerrainObject;

/// AP per MU by terrain. Open ground is the baseline and the cheapest entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    pub open: f64,
    pub hill: f64,
    /// Tree clusters, tree stands and debris.
    pub difficult: f64,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            open: OPEN_COST_PER_MU,
            hill: HILL_COST_PER_MU,
            difficult: DIFFICULT_COST_PER_MU,
        }
    }
}

impl CostTable {
    /// Cost of crossing a terrain kind; `None` is impassable.
    pub fn cost_for(&self, kind: TerrainKind) -> Option<f64> {
        match kind {
            TerrainKind::Hill => Some(self.hill),
            TerrainKind::TreeCluster | TerrainKind::TreeStand | TerrainKind::Debris => {
                Some(self.difficult)
            }
            TerrainKind::TreeSingle | TerrainKind::Building | TerrainKind::Wall => None,
        }
    }

    /// Cost at a point: the worst terrain containing it, open ground if none.
    /// Points off the battlefield are impassable.
    pub fn cost_at(&self, map: &TerrainMap, point: &Position) -> Option<f64> {
        if !map.size().contains(point) {
            return None;
        }
        map.objects_at(point)
            .try_fold(self.open, |worst, obj| {
                self.cost_for(obj.kind()).map(|c| worst.max(c))
            })
    }
}

/// Grid cell coordinate (column, row).
pub type Cell = (usize, usize);

/// Rasterised cost table over the battlefield.
#[derive(Debug, Clone)]
pub struct CostGrid {
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    origin: f64,
    costs: Vec<Option<f64>>,
}

impl CostGrid {
    /// A cell is blocked when any impassable footprint overlaps its square,
    /// however thin. Otherwise it takes the worst passable cost among its
    /// center, corners and edge midpoints.
    pub fn build(map: &TerrainMap, table: &CostTable, cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            PATH_GRID_CELL_MU
        };
        let side = map.size().side;
        let n = (side / cell_size).ceil().max(1.0) as usize;
        let origin = -map.size().half();
        let mut grid = Self {
            cell_size,
            cols: n,
            rows: n,
            origin,
            costs: Vec::with_capacity(n * n),
        };
        let size = map.size();
        let blockers: Vec<&TerrainObject> = map
            .objects()
            .iter()
            .filter(|obj| table.cost_for(obj.kind()).is_none())
            .collect();
        let h = cell_size / 2.0;
        for row in 0..n {
            for col in 0..n {
                let c = grid.center((col, row));
                let lo = DVec2::new(c.x - h, c.y - h);
                let hi = DVec2::new(c.x + h, c.y + h);
                if blockers.iter().any(|obj| overlaps_cell(obj, lo, hi)) {
                    grid.costs.push(None);
                    continue;
                }
                let mut worst = table.open;
                for dx in [-h, 0.0, h] {
                    for dy in [-h, 0.0, h] {
                        let p = size.clamp(&Position::new(c.x + dx, c.y + dy));
                        worst = map
                            .objects_at(&p)
                            .filter_map(|obj| table.cost_for(obj.kind()))
                            .fold(worst, f64::max);
                    }
                }
                grid.costs.push(Some(worst));
            }
        }
        grid
    }

    pub fn center(&self, (col, row): Cell) -> Position {
        Position::new(
            self.origin + (col as f64 + 0.5) * self.cell_size,
            self.origin + (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Cell containing a point, clamped onto the grid.
    pub fn cell_of(&self, point: &Position) -> Cell {
        let index = |v: f64, n: usize| {
            let i = ((v - self.origin) / self.cell_size).floor();
            (i.max(0.0) as usize).min(n - 1)
        };
        (index(point.x, self.cols), index(point.y, self.rows))
    }

    pub fn cost(&self, (col, row): Cell) -> Option<f64> {
        self.costs[row * self.cols + col]
    }

    pub fn index(&self, (col, row): Cell) -> usize {
        row * self.cols + col
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// 8-connected neighbours inside the grid.
    pub fn neighbors(&self, (col, row): Cell) -> impl Iterator<Item = Cell> + '_ {
        const STEPS: [(i64, i64); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        STEPS.iter().filter_map(move |(dx, dy)| {
            let c = col as i64 + dx;
            let r = row as i64 + dy;
            (c >= 0 && r >= 0 && (c as usize) < self.cols && (r as usize) < self.rows)
                .then_some((c as usize, r as usize))
        })
    }
}

/// Overlap tolerance, so pieces that merely touch a cell edge leave it open.
const OVERLAP_EPSILON: f64 = 1e-9;

/// Whether an object's footprint overlaps the axis-aligned square `lo..hi`
/// with positive area. Structures use a separating-axis test on their
/// rotated rectangle; everything else its circle.
fn overlaps_cell(obj: &TerrainObject, lo: DVec2, hi: DVec2) -> bool {
    let Some(corners) = obj.corners() else {
        let center = obj.position.to_dvec2();
        let nearest = center.clamp(lo, hi);
        return center.distance(nearest) < obj.footprint_radius() - OVERLAP_EPSILON;
    };
    let square = [lo, DVec2::new(hi.x, lo.y), hi, DVec2::new(lo.x, hi.y)];
    let axes = [
        DVec2::X,
        DVec2::Y,
        (corners[1] - corners[0]).normalize_or_zero(),
        (corners[3] - corners[0]).normalize_or_zero(),
    ];
    axes.iter().all(|&axis| {
        let project = |points: &[DVec2; 4]| {
            points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
                let d = p.dot(axis);
                (min.min(d), max.max(d))
            })
        };
        let (a_min, a_max) = project(&corners);
        let (b_min, b_max) = project(&square);
        a_min < b_max - OVERLAP_EPSILON && b_min < a_max - OVERLAP_EPSILON
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mest_core::enums::HillSize;
    use mest_core::mission::TerrainEntry;

    #[test]
    fn test_cost_at_by_terrain() {
        let mut map = TerrainMap::default();
        map.place(&TerrainEntry::new(TerrainKind::Hill, -10.0, 0.0).with_size(HillSize::Medium))
            .unwrap();
        map.place(&TerrainEntry::new(TerrainKind::TreeCluster, 10.0, 0.0))
            .unwrap();
        map.place(&TerrainEntry::new(TerrainKind::Building, 0.0, 10.0))
            .unwrap();
        let table = CostTable::default();
        assert_eq!(table.cost_at(&map, &Position::new(0.0, 0.0)), Some(0.5));
        assert_eq!(table.cost_at(&map, &Position::new(-10.0, 1.0)), Some(0.75));
        assert_eq!(table.cost_at(&map, &Position::new(10.0, 1.0)), Some(1.0));
        assert_eq!(table.cost_at(&map, &Position::new(0.0, 10.0)), None);
        assert_eq!(table.cost_at(&map, &Position::new(30.0, 0.0)), None);
    }

    #[test]
    fn test_grid_catches_small_trees() {
        let mut map = TerrainMap::default();
        // Sits on a cell corner, away from every cell center.
        map.place(&TerrainEntry::new(TerrainKind::TreeSingle, 0.0, 0.0))
            .unwrap();
        let grid = CostGrid::build(&map, &CostTable::default(), 1.0);
        let cell = grid.cell_of(&Position::new(0.5, 0.5));
        assert_eq!(grid.cost(cell), None);
        assert_eq!(grid.cost(grid.cell_of(&Position::new(5.5, 5.5))), Some(0.5));
    }

    #[test]
    fn test_grid_blocks_thin_wall_between_samples() {
        let mut map = TerrainMap::default();
        // Spans x in [0.1, 0.4]: between the sample columns at x = 0.0 and 0.5.
        let mut wall = TerrainEntry::new(TerrainKind::Wall, 0.25, 0.0).with_rotation(90.0);
        wall.depth = Some(0.3);
        map.place(&wall).unwrap();
        let grid = CostGrid::build(&map, &CostTable::default(), 1.0);
        for y in [-2.5, -0.5, 0.5, 2.5] {
            assert_eq!(grid.cost(grid.cell_of(&Position::new(0.5, y))), None, "y = {y}");
        }
        // Neighbouring columns and the cells past the wall's ends stay open.
        assert_eq!(grid.cost(grid.cell_of(&Position::new(-0.5, 0.5))), Some(0.5));
        assert_eq!(grid.cost(grid.cell_of(&Position::new(1.5, 0.5))), Some(0.5));
        assert_eq!(grid.cost(grid.cell_of(&Position::new(0.5, 3.5))), Some(0.5));
    }

    #[test]
    fn test_touching_structure_leaves_cell_open() {
        let mut map = TerrainMap::default();
        // Default building spans x in [-3, 3], y in [-2, 2].
        map.place(&TerrainEntry::new(TerrainKind::Building, 0.0, 0.0))
            .unwrap();
        let grid = CostGrid::build(&map, &CostTable::default(), 1.0);
        assert_eq!(grid.cost(grid.cell_of(&Position::new(2.5, 1.5))), None);
        assert_eq!(grid.cost(grid.cell_of(&Position::new(3.5, 0.5))), Some(0.5));
        assert_eq!(grid.cost(grid.cell_of(&Position::new(0.5, 2.5))), Some(0.5));
    }

    #[test]
    fn test_cell_mapping() {
        let grid = CostGrid::build(&TerrainMap::default(), &CostTable::default(), 1.0);
        assert_eq!((grid.cols, grid.rows), (48, 48));
        assert_eq!(grid.cell_of(&Position::new(-24.0, -24.0)), (0, 0));
        assert_eq!(grid.cell_of(&Position::new(24.0, 24.0)), (47, 47));
        let c = grid.center((24, 24));
        assert_eq!((c.x, c.y), (0.5, 0.5));
        assert_eq!(grid.neighbors((0, 0)).count(), 3);
        assert_eq!(grid.neighbors((5, 5)).count(), 8);
    }
}
