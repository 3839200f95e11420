//! `FloorPlan`: the floor rectangle, its collidable bodies, and the
//! occupancy grid derived from them.

use ft_core::{Aabb, FloorBounds, Ray, Vec3};

use crate::grid::SpatialGrid;
use crate::obstacles::{CollisionQuery, ObstacleSet};
use crate::planner::{Path, PathPlanner};
use crate::{SpatialError, SpatialResult};

/// Static geometry of one world generation.
///
/// The grid always reflects the current `obstacles` and `bounds`: every
/// mutator rebuilds it before returning.
pub struct FloorPlan {
    bounds:    FloorBounds,
    cell_size: f64,
    obstacles: ObstacleSet,
    grid:      SpatialGrid,
}

impl FloorPlan {
    pub fn new(bounds: FloorBounds, cell_size: f64, bodies: Vec<Aabb>) -> SpatialResult<Self> {
        validate(bounds, cell_size)?;
        let obstacles = ObstacleSet::new(bodies);
        let grid = SpatialGrid::build(obstacles.bodies(), bounds, cell_size);
        tracing::debug!(
            cols = grid.cols(),
            rows = grid.rows(),
            blocked = grid.blocked_count(),
            "built navigation grid"
        );
        Ok(Self { bounds, cell_size, obstacles, grid })
    }

    /// Recompute the grid from scratch.
    pub fn rebuild_grid(&mut self) {
        self.grid = SpatialGrid::build(self.obstacles.bodies(), self.bounds, self.cell_size);
    }

    pub fn add_obstacle(&mut self, body: Aabb) {
        self.obstacles.insert(body);
        self.rebuild_grid();
    }

    /// Resize the floor, keeping the obstacle set.
    pub fn set_bounds(&mut self, bounds: FloorBounds) -> SpatialResult<()> {
        validate(bounds, self.cell_size)?;
        self.bounds = bounds;
        self.rebuild_grid();
        Ok(())
    }

    pub fn bounds(&self) -> FloorBounds { self.bounds }
    pub fn cell_size(&self) -> f64 { self.cell_size }
    pub fn obstacles(&self) -> &ObstacleSet { &self.obstacles }
    pub fn grid(&self) -> &SpatialGrid { &self.grid }

    /// Plan over the current grid.
    pub fn plan(&self, planner: &dyn PathPlanner, start: Vec3, goal: Vec3) -> SpatialResult<Path> {
        planner.find_path(&self.grid, start, goal)
    }

    /// `true` if no body blocks the straight segment `from → to`.
    pub fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        match Ray::between(from, to) {
            Some((ray, dist)) => self.obstacles.nearest_hit(&ray, dist).is_none(),
            None => true,
        }
    }
}

fn validate(bounds: FloorBounds, cell_size: f64) -> SpatialResult<()> {
    if !(cell_size > 0.0 && cell_size.is_finite()) {
        return Err(SpatialError::InvalidFloor(format!("cell size must be positive, got {cell_size}")));
    }
    if !(bounds.width() > 0.0 && bounds.depth() > 0.0) {
        return Err(SpatialError::InvalidFloor(format!(
            "floor must have positive area, got {} x {}",
            bounds.width(),
            bounds.depth()
        )));
    }
    Ok(())
}
