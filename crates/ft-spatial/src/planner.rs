//! Path-planning trait and default A* implementation.
//!
//! # Pluggability
//!
//! The AGV controller plans through the [`PathPlanner`] trait, so a different
//! search (theta*, jump-point search, a smoothing post-pass) can be dropped in
//! without touching the controller.  [`AStarPlanner`] is the default.
//!
//! # Endpoints
//!
//! Start and goal are mapped to grid cells and clamped onto the grid.  A
//! blocked endpoint is snapped to the nearest free cell within
//! `snap_radius` rings; if there is none, planning fails with
//! [`SpatialError::NoFreeCell`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ft_core::Vec3;

use crate::grid::{GridCell, SpatialGrid};
use crate::{SpatialError, SpatialResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// A planned route: grid cells from the (snapped) start cell to the
/// (snapped) goal cell inclusive, and their world-space centres.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub cells:     Vec<GridCell>,
    /// Cell centres at ride height, one per entry of `cells`.
    pub waypoints: Vec<Vec3>,
    /// Total step cost in cell units (1 per straight step, √2 per diagonal).
    pub cost:      f64,
}

impl Path {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Never true for a path returned by a planner; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Path length in world units.
    pub fn world_length(&self, cell_size: f64) -> f64 {
        self.cost * cell_size
    }

    pub fn last(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }
}

// ── PathPlanner trait ─────────────────────────────────────────────────────────

/// Pluggable grid path search.
///
/// Implementations must be `Send + Sync` so one planner can be shared by
/// several worlds running on different threads.
pub trait PathPlanner: Send + Sync {
    /// Plan from world point `start` to world point `goal` over `grid`.
    ///
    /// Returns a non-empty [`Path`].  Failure is an ordinary outcome that
    /// callers recover from; it never means the grid is corrupt.
    fn find_path(&self, grid: &SpatialGrid, start: Vec3, goal: Vec3) -> SpatialResult<Path>;
}

// ── AStarPlanner ──────────────────────────────────────────────────────────────

/// 8-connected grid A* with a Euclidean heuristic.
///
/// Diagonal moves may cut past a blocked corner as long as the diagonal cell
/// itself is free; obstacle clearance is already baked into the grid.
#[derive(Debug, Clone, Copy)]
pub struct AStarPlanner {
    /// Outermost ring searched when an endpoint lies on a blocked cell.
    pub snap_radius: i32,
}

impl Default for AStarPlanner {
    fn default() -> Self {
        Self { snap_radius: 3 }
    }
}

impl AStarPlanner {
    pub fn new(snap_radius: i32) -> Self {
        Self { snap_radius }
    }

    fn snap(&self, grid: &SpatialGrid, p: Vec3) -> SpatialResult<GridCell> {
        let cell = grid.clamp_cell(grid.world_to_grid(p));
        grid.snap_to_free(cell, self.snap_radius)
            .ok_or(SpatialError::NoFreeCell { cell, radius: self.snap_radius })
    }
}

impl PathPlanner for AStarPlanner {
    fn find_path(&self, grid: &SpatialGrid, start: Vec3, goal: Vec3) -> SpatialResult<Path> {
        let s = self.snap(grid, start)?;
        let g = self.snap(grid, goal)?;
        astar(grid, s, g)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Open-set entry.  Ordered so that `BinaryHeap` (a max-heap) pops the lowest
/// `f` first and, among equal `f`, the entry pushed first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    f:    f64,
    seq:  u64,
    cell: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

const NO_PARENT: usize = usize::MAX;

fn astar(grid: &SpatialGrid, start: GridCell, goal: GridCell) -> SpatialResult<Path> {
    let n = grid.len();
    // g[v] = best known cost to reach v; closed[v] once v has been expanded.
    let mut g      = vec![f64::INFINITY; n];
    let mut parent = vec![NO_PARENT; n];
    let mut closed = vec![false; n];

    let si = grid.index_of(start);
    let gi = grid.index_of(goal);
    g[si] = 0.0;

    let mut seq = 0u64;
    let mut open = BinaryHeap::new();
    open.push(Frontier { f: start.distance(goal), seq, cell: si });

    while let Some(Frontier { cell, .. }) = open.pop() {
        if closed[cell] {
            continue; // stale entry
        }
        if cell == gi {
            return Ok(reconstruct(grid, &parent, gi, g[gi]));
        }
        closed[cell] = true;

        let current = grid.cell_at(cell);
        for (next, step) in grid.neighbours(current) {
            let ni = grid.index_of(next);
            if closed[ni] {
                continue;
            }
            let tentative = g[cell] + step;
            if tentative < g[ni] {
                g[ni] = tentative;
                parent[ni] = cell;
                seq += 1;
                open.push(Frontier { f: tentative + next.distance(goal), seq, cell: ni });
            }
        }
    }

    tracing::debug!(from = %start, to = %goal, "A* exhausted the open set");
    Err(SpatialError::NoPath { from: start, to: goal })
}

fn reconstruct(grid: &SpatialGrid, parent: &[usize], goal: usize, cost: f64) -> Path {
    let mut cells = Vec::new();
    let mut cur = goal;
    while cur != NO_PARENT {
        cells.push(grid.cell_at(cur));
        cur = parent[cur];
    }
    cells.reverse();
    let waypoints = cells.iter().map(|&c| grid.grid_to_world(c)).collect();
    Path { cells, waypoints, cost }
}
