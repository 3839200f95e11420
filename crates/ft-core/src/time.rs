//! Simulation time model.
//!
//! # Design
//!
//! The tick loop is driven by an external display loop that hands in a
//! variable `delta` in seconds.  `SimClock` accumulates those deltas while
//! the world is running; `SimTime` is the millisecond timestamp derived from
//! it and is the key of the wake queue.
//!
//! Keying scheduled events by an integer millisecond count keeps queue
//! ordering exact even though the accumulated seconds are floating point.

use std::fmt;

// ── SimTime ──────────────────────────────────────────────────────────────────

/// Simulated milliseconds since the current world generation started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// The time `ms` milliseconds after `self`.
    #[inline]
    pub fn after_ms(self, ms: u64) -> SimTime {
        SimTime(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed from `earlier` to `self` (zero if `earlier` is
    /// later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Accumulates simulated running time from externally supplied deltas.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    elapsed_secs: f64,
    ticks:        u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `delta` may advance the clock.  Zero, negative and
    /// non-finite deltas are clock anomalies and must be ignored.
    #[inline]
    pub fn accepts(delta_secs: f64) -> bool {
        delta_secs.is_finite() && delta_secs > 0.0
    }

    /// Advance by `delta_secs`.  Returns `false` (and does nothing) if the
    /// delta is rejected by [`SimClock::accepts`].
    pub fn advance(&mut self, delta_secs: f64) -> bool {
        if !Self::accepts(delta_secs) {
            return false;
        }
        self.elapsed_secs += delta_secs;
        self.ticks += 1;
        true
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Number of accepted ticks so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current timestamp, truncated to whole milliseconds.
    #[inline]
    pub fn now(&self) -> SimTime {
        SimTime((self.elapsed_secs * 1000.0) as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tick {})", self.now(), self.ticks)
    }
}
