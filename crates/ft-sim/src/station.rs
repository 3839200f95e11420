//! Base station (gNodeB) records and their placement.

use ft_core::{AgvId, SimRng, StationId, Vec3};
use ft_radio::StationSite;
use serde::{Deserialize, Serialize};

pub const MAST_HEIGHT: f64 = 18.0;
pub const VENDORS: [&str; 4] = ["Ericsson", "Nokia", "Huawei", "Samsung"];
pub const BANDS: [&str; 3] = ["n78", "n257", "n258"];

/// Stations past the fourth are spread on a ring of this fraction of the
/// floor size.
const RING_FRACTION: f64 = 0.35;

/// One base station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStation {
    pub id:            StationId,
    /// `gNodeB-1`, `gNodeB-2`, …
    pub label:         String,
    /// Ground position of the mast.
    pub position:      Vec3,
    pub height:        f64,
    pub vendor:        String,
    pub band:          String,
    pub status:        String,
    /// AGVs served this tick.  Rebuilt every tick from AGV associations.
    pub connected_ues: Vec<AgvId>,
}

impl BaseStation {
    pub fn new(id: StationId, position: Vec3, vendor: &str, band: &str) -> Self {
        Self {
            id,
            label: format!("gNodeB-{}", id.0 + 1),
            position,
            height: MAST_HEIGHT,
            vendor: vendor.to_owned(),
            band: band.to_owned(),
            status: "active".to_owned(),
            connected_ues: Vec::new(),
        }
    }

    /// Number of connected UEs.
    #[inline]
    pub fn load(&self) -> usize {
        self.connected_ues.len()
    }

    pub fn site(&self) -> StationSite {
        StationSite { id: self.id, position: self.position }
    }
}

/// Default mast positions for `count` stations on a floor of side `size`.
///
/// The first four sit on the quarter grid; any further stations are spaced
/// evenly on a ring around the centre.
pub fn default_positions(count: usize, size: f64) -> Vec<Vec3> {
    let q = size / 4.0;
    let quarters = [(-q, -q), (q, -q), (-q, q), (q, q)];
    let mut positions: Vec<Vec3> = quarters
        .iter()
        .take(count)
        .map(|&(x, z)| Vec3::new(x, 0.0, z))
        .collect();

    let extra = count.saturating_sub(quarters.len());
    let radius = size * RING_FRACTION;
    for i in 0..extra {
        let angle = i as f64 / extra as f64 * std::f64::consts::TAU;
        positions.push(Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius));
    }
    positions
}

/// Build station records at `positions` with a random vendor and band each.
pub fn place_stations(positions: &[Vec3], rng: &mut SimRng) -> Vec<BaseStation> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let vendor = rng.choose(&VENDORS).copied().unwrap_or(VENDORS[0]);
            let band = rng.choose(&BANDS).copied().unwrap_or(BANDS[0]);
            BaseStation::new(StationId(i as u32), p, vendor, band)
        })
        .collect()
}
