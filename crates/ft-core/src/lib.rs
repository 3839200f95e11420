//! `ft-core`: foundational types for the `factory_twin` AGV simulation.
//!
//! This crate is a dependency of every other `ft-*` crate.  It has no `ft-*`
//! dependencies and only one required external one (`rand`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AgvId`, `StationId`                                  |
//! | [`geo`]     | `Vec3`, `Aabb`, `Ray`, `FloorBounds`                  |
//! | [`time`]    | `SimTime`, `SimClock`                                 |
//! | [`rng`]     | `AgentRng` (per-AGV), `SimRng` (world-level)          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{Aabb, FloorBounds, Ray, Vec3};
pub use ids::{AgvId, StationId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimTime};
