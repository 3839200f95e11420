//! SINR and throughput.

use ft_core::SimRng;

use crate::{dbm_to_watts, RadioParams};

// ── Jitter ────────────────────────────────────────────────────────────────────

/// Source of the cosmetic throughput jitter factor.
///
/// Injected so tests can pin it; the world uses its seeded [`SimRng`].
pub trait JitterSource {
    /// A factor in `[lo, hi]`.
    fn jitter(&mut self, lo: f64, hi: f64) -> f64;
}

impl JitterSource for SimRng {
    fn jitter(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.unit() * (hi - lo)
    }
}

/// Always returns the same factor, clamped into the requested range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn jitter(&mut self, lo: f64, hi: f64) -> f64 {
        self.0.clamp(lo, hi)
    }
}

// ── Quality ───────────────────────────────────────────────────────────────────

/// Thermal noise power over the configured bandwidth (W).
pub fn noise_watts(params: &RadioParams) -> f64 {
    dbm_to_watts(params.noise_density_dbm_hz + 10.0 * params.bandwidth_hz.log10())
}

/// SINR in dB of `serving_dbm` against the sum of `interferers_dbm` plus
/// thermal noise.
pub fn sinr_db(params: &RadioParams, serving_dbm: f64, interferers_dbm: impl IntoIterator<Item = f64>) -> f64 {
    let interference: f64 = interferers_dbm.into_iter().map(dbm_to_watts).sum();
    10.0 * (dbm_to_watts(serving_dbm) / (interference + noise_watts(params))).log10()
}

/// Shannon-style throughput estimate in Mbps.
///
/// Exactly zero at or below the SINR floor; otherwise non-decreasing in
/// SINR for a fixed jitter factor.
pub fn estimate_throughput<J: JitterSource + ?Sized>(params: &RadioParams, sinr_db: f64, jitter: &mut J) -> f64 {
    if !(sinr_db > params.sinr_floor_db) {
        return 0.0;
    }
    let efficiency = (1.0 + 10f64.powf(sinr_db / 10.0)).log2();
    let (lo, hi) = params.jitter;
    (efficiency * params.throughput_scale_mbps).min(params.throughput_cap_mbps) * jitter.jitter(lo, hi)
}
