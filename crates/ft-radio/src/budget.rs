//! Path loss and received-power measurement.

use ft_core::{Ray, StationId, Vec3};
use ft_spatial::CollisionQuery;

use crate::RadioParams;

/// What the link model needs to know about a base station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationSite {
    pub id:       StationId,
    /// Ground position of the mast.
    pub position: Vec3,
}

/// Received power from one station.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub station:  StationId,
    pub rsrp_dbm: f64,
    /// `false` if the shadow penalty was applied.
    pub los:      bool,
}

/// `10^((dbm − 30) / 10)`.
#[inline]
pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf((dbm - 30.0) / 10.0)
}

/// Log-distance path loss in dB.  Distances below the reference distance,
/// including zero, are clamped to it so the logarithm stays finite.
pub fn path_loss_db(params: &RadioParams, distance: f64) -> f64 {
    let d = if distance.is_finite() {
        distance.max(params.reference_distance_m)
    } else {
        params.reference_distance_m
    };
    params.reference_loss_db + 10.0 * params.path_loss_exponent * d.log10()
}

/// Received power at `from` from every station, strongest first.
///
/// A station is shadowed when the first obstacle hit along the straight line
/// toward it lies strictly closer than the station.  Equal powers keep the
/// input order.
pub fn measure<Q: CollisionQuery + ?Sized>(
    params:    &RadioParams,
    from:      Vec3,
    stations:  &[StationSite],
    obstacles: &Q,
) -> Vec<Signal> {
    let mut signals: Vec<Signal> = stations
        .iter()
        .map(|s| {
            let distance = from.distance(s.position);
            let los = match Ray::between(from, s.position) {
                Some((ray, dist)) => obstacles.nearest_hit(&ray, dist).is_none(),
                None => true,
            };
            let mut loss = path_loss_db(params, distance);
            if !los {
                loss += params.shadow_loss_db;
            }
            Signal { station: s.id, rsrp_dbm: params.tx_power_dbm - loss, los }
        })
        .collect();
    signals.sort_by(|a, b| b.rsrp_dbm.total_cmp(&a.rsrp_dbm));
    signals
}
