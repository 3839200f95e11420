//! `ft-spatial`: obstacle geometry, occupancy grid, and path planning.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`obstacles`] | `ObstacleSet` (R-tree + slab test), `CollisionQuery` trait    |
//! | [`grid`]      | `SpatialGrid`, `GridCell`                                     |
//! | [`planner`]   | `PathPlanner` trait, `Path`, `AStarPlanner`                   |
//! | [`floor`]     | `FloorPlan`: obstacles, bounds, derived grid                  |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod floor;
pub mod grid;
pub mod obstacles;
pub mod planner;


pub use error::{SpatialError, SpatialResult};
pub use floor::FloorPlan;
pub use grid::{GridCell, SpatialGrid, CLEARANCE, RIDE_HEIGHT};
pub use obstacles::{CollisionQuery, ObstacleSet};
pub use planner::{AStarPlanner, Path, PathPlanner};
