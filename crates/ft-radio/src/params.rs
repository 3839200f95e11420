//! Link budget constants.

use crate::{RadioError, RadioResult};

/// Constants of the link budget.  Defaults model a 20 MHz 5G NR carrier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RadioParams {
    /// Station transmit power (dBm).
    pub tx_power_dbm:          f64,
    /// Path loss at the reference distance (dB).
    pub reference_loss_db:     f64,
    /// Distances below this are treated as this (m).
    pub reference_distance_m:  f64,
    pub path_loss_exponent:    f64,
    /// Extra loss when an obstacle blocks line of sight (dB).
    pub shadow_loss_db:        f64,
    /// Thermal noise density (dBm/Hz).
    pub noise_density_dbm_hz:  f64,
    pub bandwidth_hz:          f64,
    /// A neighbour must beat the serving cell by more than this (dB).
    pub handover_margin_db:    f64,
    /// Mbps per bit/s/Hz of spectral efficiency.
    pub throughput_scale_mbps: f64,
    pub throughput_cap_mbps:   f64,
    /// Uniform jitter factor range applied to throughput.
    pub jitter:                (f64, f64),
    /// Reported while no station serves the AGV.
    pub rsrp_floor_dbm:        f64,
    pub sinr_floor_db:         f64,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            tx_power_dbm:          23.0,
            reference_loss_db:     32.45,
            reference_distance_m:  1.0,
            path_loss_exponent:    2.5,
            shadow_loss_db:        10.0,
            noise_density_dbm_hz:  -174.0,
            bandwidth_hz:          20e6,
            handover_margin_db:    3.0,
            throughput_scale_mbps: 20.0,
            throughput_cap_mbps:   400.0,
            jitter:                (0.8, 1.2),
            rsrp_floor_dbm:        -140.0,
            sinr_floor_db:         -20.0,
        }
    }
}

impl RadioParams {
    pub fn validate(&self) -> RadioResult<()> {
        let bad = |name, reason: String| Err(RadioError::InvalidParam { name, reason });
        if !(self.reference_distance_m > 0.0) {
            return bad("reference_distance_m", format!("must be positive, got {}", self.reference_distance_m));
        }
        if !(self.bandwidth_hz > 0.0) {
            return bad("bandwidth_hz", format!("must be positive, got {}", self.bandwidth_hz));
        }
        if self.handover_margin_db < 0.0 {
            return bad("handover_margin_db", format!("must be non-negative, got {}", self.handover_margin_db));
        }
        let (lo, hi) = self.jitter;
        if !(0.0 <= lo && lo <= hi) {
            return bad("jitter", format!("expected 0 <= lo <= hi, got ({lo}, {hi})"));
        }
        if self.throughput_cap_mbps < 0.0 || self.throughput_scale_mbps < 0.0 {
            return bad("throughput", "scale and cap must be non-negative".into());
        }
        Ok(())
    }
}
