//! Motion and battery tuning.

use crate::{MobilityError, MobilityResult};

/// Thresholds, delays, and battery rates used by
/// [`AgvController`](crate::AgvController).
///
/// Distances given in cells are multiplied by the floor's cell size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionParams {
    /// A waypoint counts as reached inside this radius (cells).
    pub waypoint_reach_cells: f64,
    /// Ray length for collision lookahead (cells).
    pub lookahead_cells:      f64,
    /// Continuous blocked time before replanning (seconds).
    pub stuck_secs:           f64,
    /// Delay range before retrying a failed assignment (ms, inclusive).
    pub retry_delay_ms:       (u64, u64),
    /// Delay range between reaching a destination and the next task (ms).
    pub arrival_delay_ms:     (u64, u64),
    /// Battery drain while not charging (% per second).
    pub drain_pct_per_sec:    f64,
    /// Battery gain while stationed at the charger (% per second).
    pub charge_pct_per_sec:   f64,
    /// Below this the next assignment is a charging run.
    pub low_battery_pct:      f64,
    /// Positions and targets are clamped this far inside the floor edge.
    pub bounds_inset:         f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            waypoint_reach_cells: 0.6,
            lookahead_cells:      1.2,
            stuck_secs:           0.8,
            retry_delay_ms:       (500, 2_000),
            arrival_delay_ms:     (800, 2_000),
            drain_pct_per_sec:    0.1,
            charge_pct_per_sec:   10.0,
            low_battery_pct:      20.0,
            bounds_inset:         2.0,
        }
    }
}

impl MotionParams {
    pub fn validate(&self) -> MobilityResult<()> {
        let positive = [
            ("waypoint_reach_cells", self.waypoint_reach_cells),
            ("lookahead_cells", self.lookahead_cells),
            ("stuck_secs", self.stuck_secs),
        ];
        for (name, v) in positive {
            if !(v > 0.0 && v.is_finite()) {
                return Err(MobilityError::InvalidParams(format!("{name} must be positive, got {v}")));
            }
        }
        for (name, (lo, hi)) in [("retry_delay_ms", self.retry_delay_ms), ("arrival_delay_ms", self.arrival_delay_ms)] {
            if lo > hi {
                return Err(MobilityError::InvalidParams(format!("{name} range is empty: {lo} > {hi}")));
            }
        }
        if self.drain_pct_per_sec < 0.0 || self.charge_pct_per_sec < 0.0 {
            return Err(MobilityError::InvalidParams("battery rates must be non-negative".into()));
        }
        if !(0.0..=100.0).contains(&self.low_battery_pct) {
            return Err(MobilityError::InvalidParams(format!(
                "low_battery_pct must be within 0..=100, got {}",
                self.low_battery_pct
            )));
        }
        if self.bounds_inset < 0.0 {
            return Err(MobilityError::InvalidParams("bounds_inset must be non-negative".into()));
        }
        Ok(())
    }
}
