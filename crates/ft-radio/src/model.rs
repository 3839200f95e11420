//! One AGV's link evaluation per tick.

use ft_core::{StationId, Vec3};
use ft_spatial::CollisionQuery;

use crate::{
    estimate_throughput, measure, select_serving, sinr_db, JitterSource, RadioParams, Selection,
    Signal, StationSite,
};

/// Radio state of one AGV after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkReport {
    pub selection:       Selection,
    pub rsrp_dbm:        f64,
    pub sinr_db:         f64,
    pub throughput_mbps: f64,
}

impl LinkReport {
    pub fn serving(&self) -> Option<StationId> {
        self.selection.serving()
    }
}

/// Bundles [`RadioParams`] with the measure → select → quality pipeline.
#[derive(Debug, Clone, Default)]
pub struct LinkModel {
    pub params: RadioParams,
}

impl LinkModel {
    pub fn new(params: RadioParams) -> Self {
        Self { params }
    }

    /// Received power at `from` from every station, strongest first.
    pub fn measure<Q: CollisionQuery + ?Sized>(
        &self,
        from:      Vec3,
        stations:  &[StationSite],
        obstacles: &Q,
    ) -> Vec<Signal> {
        measure(&self.params, from, stations, obstacles)
    }

    /// Select the serving station and compute link quality against it.
    ///
    /// With no stations the report carries the floor values.
    pub fn evaluate<J: JitterSource + ?Sized>(
        &self,
        current: Option<StationId>,
        signals: &[Signal],
        jitter:  &mut J,
    ) -> LinkReport {
        let p = &self.params;
        let selection = select_serving(current, signals, p.handover_margin_db);
        let serving = selection
            .serving()
            .and_then(|id| signals.iter().find(|s| s.station == id));
        let Some(serving) = serving else {
            return LinkReport {
                selection,
                rsrp_dbm: p.rsrp_floor_dbm,
                sinr_db: p.sinr_floor_db,
                throughput_mbps: 0.0,
            };
        };

        let interferers = signals
            .iter()
            .filter(|s| s.station != serving.station)
            .map(|s| s.rsrp_dbm);
        let sinr = sinr_db(p, serving.rsrp_dbm, interferers);
        LinkReport {
            selection,
            rsrp_dbm: serving.rsrp_dbm,
            sinr_db: sinr,
            throughput_mbps: estimate_throughput(p, sinr, jitter),
        }
    }
}
