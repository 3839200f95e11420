//! World observer trait for persistence hooks and progress reporting.

use ft_core::{AgvId, SimTime};
use ft_schedule::Generation;
use serde::{Deserialize, Serialize};

use crate::WorldSnapshot;

/// An AGV changed its serving station (first attach or handover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverEvent {
    pub time:      SimTime,
    pub agv:       AgvId,
    pub agv_label: String,
    /// Previous station label; `None` for a first attach.
    pub from:      Option<String>,
    pub to:        String,
    /// RSRP from the new station (dBm).
    pub rsrp_dbm:  f64,
}

/// Callbacks invoked by [`World::tick`][crate::World::tick] and
/// [`World::reset`][crate::World::reset].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Callbacks run inside the tick, so an
/// observer that talks to slow external storage must hand the work off
/// rather than block.
///
/// # Example: handover logger
///
/// ```rust,ignore
/// struct HandoverLog(Vec<String>);
///
/// impl SimObserver for HandoverLog {
///     fn on_handover(&mut self, event: &HandoverEvent) {
///         self.0.push(format!("{} -> {}", event.agv_label, event.to));
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of every accepted tick.
    fn on_tick_start(&mut self, _time: SimTime) {}

    /// Called at the end of every accepted tick.
    fn on_tick_end(&mut self, _time: SimTime) {}

    /// Called once per association change, after the link phase.
    fn on_handover(&mut self, _event: &HandoverEvent) {}

    /// Called every `snapshot_interval_ms` of simulated running time.
    fn on_snapshot(&mut self, _snapshot: &WorldSnapshot) {}

    /// Called after a reset has rebuilt the world.
    fn on_reset(&mut self, _generation: Generation) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
