//! `WakeQueue`: AGVs waiting for a delayed `AssignTask`.
//!
//! Retries after a failed plan and the pause after reaching a destination
//! are not timers; they are entries in this queue, drained once per tick
//! against the simulation clock.  Tests advance virtual time and observe
//! exactly which AGVs wake.

use std::collections::BTreeMap;

use ft_core::{AgvId, SimTime};

/// World generation counter.  Incremented on every full reset.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(pub u32);

impl Generation {
    #[inline]
    pub fn next(self) -> Generation {
        Generation(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// A scheduled wake-up.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wake {
    pub agv:        AgvId,
    pub generation: Generation,
    /// The AGV's assignment token when the wake was scheduled.
    pub token:      u64,
}

/// Sparse time-ordered queue of [`Wake`]s.
#[derive(Default, Debug)]
pub struct WakeQueue {
    inner: BTreeMap<SimTime, Vec<Wake>>,
    /// Cached entry count for O(1) `len()`.
    total: usize,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `wake` at `at`.  Entries sharing a time keep insertion order.
    pub fn push(&mut self, at: SimTime, wake: Wake) {
        self.inner.entry(at).or_default().push(wake);
        self.total += 1;
    }

    /// Remove and return every entry due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: SimTime) -> Vec<Wake> {
        let Some(after) = now.0.checked_add(1) else {
            // `now` is the end of time: everything is due.
            return self.drain_all();
        };
        let later = self.inner.split_off(&SimTime(after));
        let due = std::mem::replace(&mut self.inner, later);
        let woken: Vec<Wake> = due.into_values().flatten().collect();
        self.total -= woken.len();
        woken
    }

    fn drain_all(&mut self) -> Vec<Wake> {
        self.total = 0;
        std::mem::take(&mut self.inner).into_values().flatten().collect()
    }

    /// Earliest scheduled time, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    /// Drop all entries and reset the running total.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
    }

    /// Total number of queued entries.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future times with at least one entry.
    pub fn time_count(&self) -> usize {
        self.inner.len()
    }

    /// `true` if `agv` has any pending entry, live or stale.
    pub fn contains(&self, agv: AgvId) -> bool {
        self.inner.values().flatten().any(|w| w.agv == agv)
    }
}
