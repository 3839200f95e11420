//! `ft-mobility`: AGV state, task dispatch, and per-tick motion control.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`agv`]        | `Agv` record, `AgvTask`, `AgvStatus`                            |
//! | [`params`]     | `MotionParams` (thresholds, delays, battery rates)              |
//! | [`dispatch`]   | `TaskPolicy` trait, `FactoryDispatch`, `Sites`, `TaskOrder`     |
//! | [`controller`] | `AgvController<P, T>`: assign / follow / replan / battery       |
//! | [`error`]      | `MobilityError`, `MobilityResult<T>`                            |
//!
//! # Motion model (summary)
//!
//! ```text
//!           AssignTask ok                 last waypoint reached
//!   Idle ─────────────────▶ Moving ───────────────────────────▶ Idle
//!    ▲  ╲ plan failed                 │ blocked for > stuck_secs
//!    │   ╲──▶ Retry(500–2000 ms)      ▼
//!    │                             replan ── failed ──▶ AssignTask now
//!    └── Retry(800–2000 ms) after a work task; Charging holds at the pad
//! ```
//!
//! The controller never sleeps or spawns timers.  Anything deferred comes
//! back to the caller as a [`Directive`] for the wake queue.

pub mod agv;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod params;

#[cfg(test)]
mod tests;

pub use agv::{Agv, AgvStatus, AgvTask, LinkFloor};
pub use controller::{AgvController, Directive};
pub use dispatch::{FactoryDispatch, Sites, TaskOrder, TaskPolicy};
pub use error::{MobilityError, MobilityResult};
pub use params::MotionParams;
