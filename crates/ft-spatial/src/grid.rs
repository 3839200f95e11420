//! Uniform occupancy grid over the factory floor.
//!
//! # Layout
//!
//! Cells are stored row-major in a single `Vec<u8>`: cell `(i, j)` (column
//! `i` along `x`, row `j` along `z`) lives at `j * cols + i`.  `0` means
//! free and `1` blocked.
//!
//! The grid is a derived structure.  It is never patched; any change to the
//! obstacle set or the floor size produces a fresh grid via
//! [`SpatialGrid::build`].

use std::fmt;

use ft_core::{Aabb, FloorBounds, Vec3};

/// Clearance added around every obstacle box before rasterisation.
pub const CLEARANCE: f64 = 0.6;

/// Height of an AGV's reference point above the floor.  Waypoints are
/// emitted at this height so they can be compared directly with positions.
pub const RIDE_HEIGHT: f64 = 0.5;

const FREE: u8 = 0;
const BLOCKED: u8 = 1;

/// The eight neighbour offsets with their step cost.
const NEIGHBOURS: [(i32, i32, f64); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, std::f64::consts::SQRT_2),
    (1, -1, std::f64::consts::SQRT_2),
    (-1, 1, std::f64::consts::SQRT_2),
    (-1, -1, std::f64::consts::SQRT_2),
];

// ── GridCell ──────────────────────────────────────────────────────────────────

/// Integer grid coordinate.  May lie outside the grid; check with
/// [`SpatialGrid::in_bounds`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub i: i32,
    pub j: i32,
}

impl GridCell {
    #[inline]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Euclidean distance in cell units, used as the A* heuristic.
    #[inline]
    pub fn distance(self, other: GridCell) -> f64 {
        f64::from(self.i - other.i).hypot(f64::from(self.j - other.j))
    }

    /// `true` if the two cells are equal or 8-adjacent.
    #[inline]
    pub fn touches(self, other: GridCell) -> bool {
        (self.i - other.i).abs() <= 1 && (self.j - other.j).abs() <= 1
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.i, self.j)
    }
}

// ── SpatialGrid ───────────────────────────────────────────────────────────────

/// Occupancy grid built from obstacle footprints.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    origin_x:  f64,
    origin_z:  f64,
    cols:      usize,
    rows:      usize,
    cells:     Vec<u8>,
}

impl SpatialGrid {
    /// An all-free grid covering `bounds`.
    ///
    /// `cell_size` must be positive; [`FloorPlan`](crate::FloorPlan) validates
    /// this before calling.
    pub fn empty(bounds: FloorBounds, cell_size: f64) -> Self {
        let cols = (bounds.width() / cell_size).ceil().max(1.0) as usize;
        let rows = (bounds.depth() / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            origin_x: bounds.min_x,
            origin_z: bounds.min_z,
            cols,
            rows,
            cells: vec![FREE; cols * rows],
        }
    }

    /// Rasterise `obstacles` onto a fresh grid.
    ///
    /// Every box is grown by [`CLEARANCE`] and every cell whose bounds touch
    /// the grown box is marked blocked.  Boxes entirely off the grid are
    /// ignored.  Deterministic: the same inputs always give the same grid.
    pub fn build(obstacles: &[Aabb], bounds: FloorBounds, cell_size: f64) -> Self {
        let mut grid = Self::empty(bounds, cell_size);
        for body in obstacles {
            grid.block_box(&body.expanded(CLEARANCE));
        }
        grid
    }

    fn block_box(&mut self, b: &Aabb) {
        let cs = self.cell_size;
        let lo_i = ((b.min.x - self.origin_x) / cs).floor() as i64;
        let hi_i = ((b.max.x - self.origin_x) / cs).floor() as i64;
        let lo_j = ((b.min.z - self.origin_z) / cs).floor() as i64;
        let hi_j = ((b.max.z - self.origin_z) / cs).floor() as i64;

        let (cols, rows) = (self.cols as i64, self.rows as i64);
        if hi_i < 0 || hi_j < 0 || lo_i >= cols || lo_j >= rows {
            return;
        }
        for j in lo_j.max(0)..=hi_j.min(rows - 1) {
            let row = j as usize * self.cols;
            for i in lo_i.max(0)..=hi_i.min(cols - 1) {
                self.cells[row + i as usize] = BLOCKED;
            }
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    pub fn cell_size(&self) -> f64 { self.cell_size }
    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == BLOCKED).count()
    }

    // ── Coordinate mapping ────────────────────────────────────────────────

    /// Cell containing world point `p`.  Not clamped.
    pub fn world_to_grid(&self, p: Vec3) -> GridCell {
        GridCell {
            i: ((p.x - self.origin_x) / self.cell_size).floor() as i32,
            j: ((p.z - self.origin_z) / self.cell_size).floor() as i32,
        }
    }

    /// World-space centre of `cell`, at [`RIDE_HEIGHT`].  Never a corner,
    /// so the result is usable directly as a waypoint.
    pub fn grid_to_world(&self, cell: GridCell) -> Vec3 {
        Vec3::new(
            self.origin_x + (f64::from(cell.i) + 0.5) * self.cell_size,
            RIDE_HEIGHT,
            self.origin_z + (f64::from(cell.j) + 0.5) * self.cell_size,
        )
    }

    /// `(min_x, min_z, max_x, max_z)` of `cell` in world space.
    pub fn cell_bounds(&self, cell: GridCell) -> (f64, f64, f64, f64) {
        let x0 = self.origin_x + f64::from(cell.i) * self.cell_size;
        let z0 = self.origin_z + f64::from(cell.j) * self.cell_size;
        (x0, z0, x0 + self.cell_size, z0 + self.cell_size)
    }

    /// Clamp `cell` onto the grid.
    pub fn clamp_cell(&self, cell: GridCell) -> GridCell {
        GridCell {
            i: cell.i.clamp(0, self.cols as i32 - 1),
            j: cell.j.clamp(0, self.rows as i32 - 1),
        }
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    #[inline]
    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.i >= 0 && cell.j >= 0 && (cell.i as usize) < self.cols && (cell.j as usize) < self.rows
    }

    /// Linear index of an in-bounds cell.
    #[inline]
    pub(crate) fn index_of(&self, cell: GridCell) -> usize {
        cell.j as usize * self.cols + cell.i as usize
    }

    #[inline]
    pub(crate) fn cell_at(&self, index: usize) -> GridCell {
        GridCell::new((index % self.cols) as i32, (index / self.cols) as i32)
    }

    /// `true` for an in-bounds free cell.  Out-of-bounds cells are never free.
    #[inline]
    pub fn is_free(&self, cell: GridCell) -> bool {
        self.in_bounds(cell) && self.cells[self.index_of(cell)] == FREE
    }

    /// `true` if the cell under world point `p` is free.
    pub fn is_free_at(&self, p: Vec3) -> bool {
        self.is_free(self.world_to_grid(p))
    }

    /// Free 8-connected neighbours of `cell` with the step cost to each.
    pub fn neighbours(&self, cell: GridCell) -> impl Iterator<Item = (GridCell, f64)> + '_ {
        NEIGHBOURS.iter().filter_map(move |&(di, dj, cost)| {
            let n = GridCell::new(cell.i + di, cell.j + dj);
            self.is_free(n).then_some((n, cost))
        })
    }

    /// Nearest free cell to `cell`, searching outward in square rings of
    /// radius `1..=radius`.
    ///
    /// Returns `cell` itself when it is already free.  Within the first ring
    /// that contains a free cell, the one closest to `cell` wins; ties keep
    /// scan order (row by row).
    pub fn snap_to_free(&self, cell: GridCell, radius: i32) -> Option<GridCell> {
        if self.is_free(cell) {
            return Some(cell);
        }
        for r in 1..=radius {
            let mut best: Option<(f64, GridCell)> = None;
            for dj in -r..=r {
                for di in -r..=r {
                    if di.abs() != r && dj.abs() != r {
                        continue; // interior: already searched
                    }
                    let n = GridCell::new(cell.i + di, cell.j + dj);
                    if !self.is_free(n) {
                        continue;
                    }
                    let d = cell.distance(n);
                    if best.is_none_or(|(bd, _)| d < bd) {
                        best = Some((d, n));
                    }
                }
            }
            if let Some((_, found)) = best {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
impl SpatialGrid {
    /// Mark a single cell blocked.  Test-only: real grids come from `build`.
    pub(crate) fn set_blocked(&mut self, cell: GridCell) {
        if self.in_bounds(cell) {
            let i = self.index_of(cell);
            self.cells[i] = BLOCKED;
        }
    }
}
