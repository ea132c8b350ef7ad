//! Movement-cost pathfinding.
//!
//! The straight segment is always priced exactly (integrated in runs of equal
//! cost) and compared with an A* search over the [`CostGrid`]; the cheaper
//! of the two wins. Point queries that only need "what does it cost to get
//! there" read a Dijkstra cost field instead of running a search per point.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mest_core::constants::{SAMPLE_RING_ANGLES, SAMPLE_RING_STEP_MU, SEGMENT_SAMPLE_MU};
use mest_core::types::Position;

use crate::grid::{Cell, CostGrid, CostTable};
use crate::map::TerrainMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Waypoints from start to end inclusive.
    pub path: Vec<Position>,
    /// Total AP cost.
    pub cost: f64,
}

/// Heap key ordered by `f64::total_cmp`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Cheapest known cost from one start point to every grid cell.
#[derive(Debug, Clone)]
pub struct CostField {
    pub start: Position,
    costs: Vec<f64>,
}

pub struct Pathfinder<'a> {
    map: &'a TerrainMap,
    table: CostTable,
    grid: CostGrid,
}

impl<'a> Pathfinder<'a> {
    pub fn new(map: &'a TerrainMap, table: CostTable, cell_size: f64) -> Self {
        let grid = CostGrid::build(map, &table, cell_size);
        Self { map, table, grid }
    }

    pub fn grid(&self) -> &CostGrid {
        &self.grid
    }

    pub fn cost_at(&self, point: &Position) -> Option<f64> {
        self.table.cost_at(self.map, point)
    }

    pub fn is_passable(&self, point: &Position) -> bool {
        self.cost_at(point).is_some()
    }

    /// Exact cost of walking the straight segment, `None` if anything on it
    /// is impassable.
    pub fn segment_cost(&self, from: &Position, to: &Position) -> Option<f64> {
        let length = from.distance_to(to);
        let steps = (length / SEGMENT_SAMPLE_MU).ceil().max(1.0) as usize;

        let mut run_cost = self.cost_at(from)?;
        let mut run_start = 0.0;
        let mut total = 0.0;
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let cost = self.cost_at(&from.lerp(to, t))?;
            if cost != run_cost {
                // Cost changes inside the last sub-step; charge its midpoint.
                let boundary = (i as f64 - 0.5) / steps as f64;
                total += (boundary - run_start) * length * run_cost;
                run_start = boundary;
                run_cost = cost;
            }
        }
        total += (1.0 - run_start) * length * run_cost;
        Some(total)
    }

    /// Cost between two points of a grid path, step length × mean cell cost.
    fn leg_cost(&self, a: &Position, ca: f64, b: &Position, cb: f64) -> f64 {
        a.distance_to(b) * (ca + cb) / 2.0
    }

    /// Cost of one search step. Steps touching the exact start or goal point
    /// are walked as real segments: those points sit off the cell centers, so
    /// the cell's grid cost says nothing about what lies between them.
    fn step_cost(
        &self,
        here: &Position,
        here_cost: f64,
        there: &Position,
        there_cost: f64,
        exact: bool,
    ) -> Option<f64> {
        if exact {
            self.segment_cost(here, there)
        } else {
            Some(self.leg_cost(here, here_cost, there, there_cost))
        }
    }

    /// Grid cost of a cell, with the start and goal cells priced at their
    /// exact points so a start beside a wall is not treated as blocked.
    fn cell_cost(&self, cell: Cell, overrides: &[(Cell, f64)]) -> Option<f64> {
        overrides
            .iter()
            .find(|(c, _)| *c == cell)
            .map(|(_, cost)| *cost)
            .or_else(|| self.grid.cost(cell))
    }

    fn astar(&self, start: &Position, end: &Position) -> Option<PathResult> {
        let start_cost = self.cost_at(start)?;
        let end_cost = self.cost_at(end)?;
        let (s, g) = (self.grid.cell_of(start), self.grid.cell_of(end));
        // Within one cell the grid adds nothing over the direct segment.
        if s == g {
            return None;
        }
        let overrides = [(s, start_cost), (g, end_cost)];
        let baseline = self.table.open;

        let point = |cell: Cell| {
            if cell == s {
                *start
            } else if cell == g {
                *end
            } else {
                self.grid.center(cell)
            }
        };

        let n = self.grid.len();
        let mut best = vec![f64::INFINITY; n];
        let mut came_from: Vec<Option<Cell>> = vec![None; n];
        let mut open = BinaryHeap::new();
        best[self.grid.index(s)] = 0.0;
        open.push(Reverse((Cost(point(s).distance_to(end) * baseline), s)));

        while let Some(Reverse((_, cell))) = open.pop() {
            if cell == g {
                break;
            }
            let Some(here_cost) = self.cell_cost(cell, &overrides) else {
                continue;
            };
            let here = point(cell);
            let so_far = best[self.grid.index(cell)];
            for next in self.grid.neighbors(cell) {
                let Some(next_cost) = self.cell_cost(next, &overrides) else {
                    continue;
                };
                let there = point(next);
                let exact = [cell, next].iter().any(|c| *c == s || *c == g);
                let Some(step) = self.step_cost(&here, here_cost, &there, next_cost, exact) else {
                    continue;
                };
                let candidate = so_far + step;
                let slot = self.grid.index(next);
                if candidate < best[slot] {
                    best[slot] = candidate;
                    came_from[slot] = Some(cell);
                    let h = there.distance_to(end) * baseline;
                    open.push(Reverse((Cost(candidate + h), next)));
                }
            }
        }

        let total = best[self.grid.index(g)];
        if !total.is_finite() {
            return None;
        }
        let mut cells = vec![g];
        let mut cursor = g;
        while let Some(prev) = came_from[self.grid.index(cursor)] {
            cells.push(prev);
            cursor = prev;
        }
        cells.reverse();

        let path = cells.into_iter().map(point).collect();
        Some(PathResult { path, cost: total })
    }

    /// Cheapest path between two points, `None` when no legal path exists.
    pub fn find_path_with_cost(&self, start: &Position, end: &Position) -> Option<PathResult> {
        let direct = self.segment_cost(start, end).map(|cost| PathResult {
            path: vec![*start, *end],
            cost,
        });
        let searched = self.astar(start, end);
        let result = match (direct, searched) {
            (Some(d), Some(s)) => Some(if s.cost < d.cost { s } else { d }),
            (d, s) => d.or(s),
        };
        debug!(
            from = ?(start.x, start.y),
            to = ?(end.x, end.y),
            cost = result.as_ref().map(|r| r.cost),
            "path search"
        );
        result
    }

    /// Like [`Pathfinder::find_path_with_cost`], but `None` over budget.
    pub fn find_path_within(&self, start: &Position, end: &Position, max_ap: f64) -> Option<PathResult> {
        self.find_path_with_cost(start, end)
            .filter(|r| r.cost <= max_ap + 1e-9)
    }

    /// Dijkstra from `start` over every reachable grid cell.
    pub fn cost_field(&self, start: &Position) -> CostField {
        let n = self.grid.len();
        let mut costs = vec![f64::INFINITY; n];
        let Some(start_cost) = self.cost_at(start) else {
            return CostField { start: *start, costs };
        };
        let s = self.grid.cell_of(start);
        let overrides = [(s, start_cost)];
        let point = |cell: Cell| if cell == s { *start } else { self.grid.center(cell) };

        let mut heap = BinaryHeap::new();
        costs[self.grid.index(s)] = 0.0;
        heap.push(Reverse((Cost(0.0), s)));
        while let Some(Reverse((Cost(so_far), cell))) = heap.pop() {
            if so_far > costs[self.grid.index(cell)] {
                continue;
            }
            let Some(here_cost) = self.cell_cost(cell, &overrides) else {
                continue;
            };
            let here = point(cell);
            for next in self.grid.neighbors(cell) {
                let Some(next_cost) = self.cell_cost(next, &overrides) else {
                    continue;
                };
                let exact = cell == s || next == s;
                let Some(step) = self.step_cost(&here, here_cost, &point(next), next_cost, exact) else {
                    continue;
                };
                let candidate = so_far + step;
                let slot = self.grid.index(next);
                if candidate < costs[slot] {
                    costs[slot] = candidate;
                    heap.push(Reverse((Cost(candidate), next)));
                }
            }
        }
        CostField { start: *start, costs }
    }

    /// Cost to reach `point` using a precomputed field: the better of the
    /// straight segment and the cheapest finished cell nearby plus a walked
    /// last leg. Neighbor cells count too, so a point in a cell the grid
    /// blocks (beside a wall, say) is still reachable from open cells.
    pub fn cost_via(&self, field: &CostField, point: &Position) -> Option<f64> {
        let direct = self.segment_cost(&field.start, point);
        let start_cell = self.grid.cell_of(&field.start);
        let cell = self.grid.cell_of(point);
        let via_grid = std::iter::once(cell)
            .chain(self.grid.neighbors(cell))
            .filter_map(|c| {
                let base = field.costs[self.grid.index(c)];
                if !base.is_finite() {
                    return None;
                }
                let from = if c == start_cell { field.start } else { self.grid.center(c) };
                self.segment_cost(&from, point).map(|leg| base + leg)
            })
            .min_by(f64::total_cmp);
        match (direct, via_grid) {
            (Some(d), Some(g)) => Some(d.min(g)),
            (d, g) => d.or(g),
        }
    }

    /// Nearest point to `target` that can be reached within `max_ap`.
    ///
    /// Sampling approximation: rings around the target every
    /// [`SAMPLE_RING_STEP_MU`], [`SAMPLE_RING_ANGLES`] points per ring, radius
    /// ascending; falls back to `start` when nothing qualifies.
    pub fn closest_reachable_point(&self, start: &Position, target: &Position, max_ap: f64) -> Position {
        let field = self.cost_field(start);
        let within = |p: &Position| self.cost_via(&field, p).is_some_and(|c| c <= max_ap + 1e-9);
        if within(target) {
            return *target;
        }
        let rings = (start.distance_to(target) / SAMPLE_RING_STEP_MU).ceil() as u32;
        for ring in 1..=rings {
            let radius = ring as f64 * SAMPLE_RING_STEP_MU;
            for step in 0..SAMPLE_RING_ANGLES {
                let angle = TAU * step as f64 / SAMPLE_RING_ANGLES as f64;
                let p = target.offset(angle, radius);
                if within(&p) {
                    return p;
                }
            }
        }
        *start
    }
}
