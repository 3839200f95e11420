//! `ft-sim`: the world context and per-frame tick loop for `factory_twin`.
//!
//! # Tick
//!
//! ```text
//! world.tick(dt, observer):
//!   paused, or dt ≤ 0 / NaN  → return false, nothing changes
//!   ① Wakes     drain WakeQueue at now; drop other generations and
//!               stale assignment tokens; AssignTask the rest
//!   ② Motion    AgvController::update per AGV (id order);
//!               AssignAfter directives → WakeQueue
//!   ③ Links     measure AGV × station power (parallel with `parallel`),
//!               then select/evaluate in id order; Attach / Handover
//!               → SimObserver::on_handover
//!   ④ Snapshot  every snapshot_interval_ms → SimObserver::on_snapshot
//! ```
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`config`]     | `WorldConfig` (TOML), `LayoutKind`                      |
//! | [`layout`]     | `FactoryLayout`: walls, workstations, charger, boxes    |
//! | [`station`]    | `BaseStation` records and default mast placement        |
//! | [`world`]      | `World<P, T>`: tick, reset, commands, views             |
//! | [`builder`]    | `WorldBuilder` (custom planner/policy, fixed placements)|
//! | [`observer`]   | `SimObserver`, `NoopObserver`, `HandoverEvent`          |
//! | [`snapshot`]   | `WorldSnapshot`, `WorldStats`                           |
//! | [`error`]      | `SimError`, `SimResult<T>`                              |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Measures received power on Rayon's thread pool.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ft_sim::{NoopObserver, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::load("factory.toml")?)?;
//! world.resume();
//! while world.tick(1.0 / 60.0, &mut NoopObserver) {
//!     // render world.snapshot() ...
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod layout;
pub mod observer;
pub mod snapshot;
pub mod station;
pub mod world;

#[cfg(test)]
mod tests;

pub use builder::WorldBuilder;
pub use config::{LayoutKind, WorldConfig};
pub use error::{SimError, SimResult};
pub use layout::FactoryLayout;
pub use observer::{HandoverEvent, NoopObserver, SimObserver};
pub use snapshot::{AgvSnapshot, StationSnapshot, WorldSnapshot, WorldStats};
pub use station::BaseStation;
pub use world::World;
