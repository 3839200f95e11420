//! Plain-data views of the world for persistence and display.
//!
//! Nothing here borrows from the world.  A snapshot can be moved to another
//! thread (e.g. a background store) while the simulation keeps ticking.

use ft_core::SimTime;
use ft_mobility::{Agv, LinkFloor};
use ft_schedule::Generation;
use serde::{Deserialize, Serialize};

use crate::BaseStation;

/// One station row: the attributes the graph store keeps on a `gNodeB`
/// node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub id:     String,
    pub band:   String,
    pub load:   usize,
    pub status: String,
    pub vendor: String,
    pub height: f64,
    pub x:      f64,
    pub y:      f64,
    pub z:      f64,
}

impl StationSnapshot {
    pub fn of(station: &BaseStation) -> Self {
        Self {
            id:     station.label.clone(),
            band:   station.band.clone(),
            load:   station.load(),
            status: station.status.clone(),
            vendor: station.vendor.clone(),
            height: station.height,
            x:      station.position.x,
            y:      station.position.y,
            z:      station.position.z,
        }
    }
}

/// One AGV row: the attributes the graph store keeps on an `AGV` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgvSnapshot {
    pub id:                 String,
    pub task:               String,
    pub imei:               String,
    pub speed:              f64,
    pub sinr_db:            f64,
    pub status:             String,
    pub rsrp_dbm:           f64,
    pub throughput_mbps:    f64,
    pub battery_percentage: f64,
    pub x:                  f64,
    pub y:                  f64,
    pub z:                  f64,
    /// Label of the serving station.
    pub connected_bs:       Option<String>,
}

impl AgvSnapshot {
    pub fn of(agv: &Agv, stations: &[BaseStation]) -> Self {
        let connected_bs = agv
            .connected_bs
            .and_then(|id| stations.get(id.index()))
            .map(|s| s.label.clone());
        Self {
            id:                 agv.label.clone(),
            task:               agv.task.label().to_owned(),
            imei:               agv.imei.clone(),
            speed:              agv.speed,
            sinr_db:            agv.sinr_db,
            status:             agv.status.to_string(),
            rsrp_dbm:           agv.rsrp_dbm,
            throughput_mbps:    agv.throughput_mbps,
            battery_percentage: agv.battery,
            x:                  agv.position.x,
            y:                  agv.position.y,
            z:                  agv.position.z,
            connected_bs,
        }
    }
}

/// Every station and AGV at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub generation: Generation,
    pub time:       SimTime,
    pub stations:   Vec<StationSnapshot>,
    pub agvs:       Vec<AgvSnapshot>,
}

impl WorldSnapshot {
    pub fn capture(
        generation: Generation,
        time:       SimTime,
        stations:   &[BaseStation],
        agvs:       &[Agv],
    ) -> Self {
        Self {
            generation,
            time,
            stations: stations.iter().map(StationSnapshot::of).collect(),
            agvs:     agvs.iter().map(|a| AgvSnapshot::of(a, stations)).collect(),
        }
    }
}

/// Fleet-wide link summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub connected_ues:         usize,
    pub total_ues:             usize,
    /// Mean over connected AGVs; the RSRP floor when none are connected.
    pub avg_rsrp_dbm:          f64,
    /// Mean over connected AGVs; the SINR floor when none are connected.
    pub avg_sinr_db:           f64,
    pub total_throughput_mbps: f64,
}

impl WorldStats {
    pub fn of(agvs: &[Agv], floor: LinkFloor) -> Self {
        let connected: Vec<&Agv> = agvs.iter().filter(|a| a.connected_bs.is_some()).collect();
        let n = connected.len();
        let (avg_rsrp_dbm, avg_sinr_db) = if n == 0 {
            (floor.rsrp_dbm, floor.sinr_db)
        } else {
            (
                connected.iter().map(|a| a.rsrp_dbm).sum::<f64>() / n as f64,
                connected.iter().map(|a| a.sinr_db).sum::<f64>() / n as f64,
            )
        };
        Self {
            connected_ues: n,
            total_ues: agvs.len(),
            avg_rsrp_dbm,
            avg_sinr_db,
            total_throughput_mbps: agvs.iter().map(|a| a.throughput_mbps).sum(),
        }
    }
}
