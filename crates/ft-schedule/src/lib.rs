//! `ft-schedule`: deferred work keyed by simulation time.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`wake_queue`] | `WakeQueue` (`BTreeMap<SimTime, Vec<Wake>>`), `Wake`, `Generation` |
//!
//! # Staleness model (summary)
//!
//! Every entry carries the world [`Generation`] it was scheduled in and the
//! AGV's assignment token at scheduling time:
//!
//! ```text
//! entry is live  ⇔  entry.generation == world.generation
//!                 ∧  entry.token      == agv.assign_token
//! ```
//!
//! A reset bumps the generation, so retries left over from the old world are
//! dropped when they come due.  An AGV bumps its token whenever it takes a
//! new assignment, so an older pending retry cannot assign it twice.

pub mod wake_queue;


pub use wake_queue::{Generation, Wake, WakeQueue};
