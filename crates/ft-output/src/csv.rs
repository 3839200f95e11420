//! CSV graph-store backend.
//!
//! Appends to three files in the configured output directory:
//! - `stations.csv`: one row per station per snapshot
//! - `agvs.csv`: one row per AGV per snapshot
//! - `queries.csv`: every statement passed to `run_query`, in order
//!
//! Rows are append-only; the latest row for an id is its current state.

use std::fs::File;
use std::path::Path;

use csv::Writer;
use ft_sim::WorldSnapshot;

use crate::store::GraphStore;
use crate::OutputResult;

pub const STATION_HEADER: [&str; 11] =
    ["generation", "time_ms", "id", "band", "load", "status", "vendor", "height", "x", "y", "z"];

pub const AGV_HEADER: [&str; 15] = [
    "generation", "time_ms", "id", "task", "imei", "speed", "sinr_db", "status", "rsrp_dbm",
    "throughput_mbps", "battery_percentage", "x", "y", "z", "connected_bs",
];

/// Writes the graph view to CSV files.
pub struct CsvStore {
    stations: Writer<File>,
    agvs:     Writer<File>,
    queries:  Writer<File>,
}

impl CsvStore {
    /// Create the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut stations = Writer::from_path(dir.join("stations.csv"))?;
        stations.write_record(STATION_HEADER)?;

        let mut agvs = Writer::from_path(dir.join("agvs.csv"))?;
        agvs.write_record(AGV_HEADER)?;

        let mut queries = Writer::from_path(dir.join("queries.csv"))?;
        queries.write_record(["query"])?;

        Ok(Self { stations, agvs, queries })
    }
}

impl GraphStore for CsvStore {
    fn run_query(&mut self, query: &str) -> OutputResult<()> {
        self.queries.write_record([query])?;
        Ok(())
    }

    fn persist_snapshot(&mut self, snapshot: &WorldSnapshot) -> OutputResult<()> {
        let generation = snapshot.generation.0.to_string();
        let time_ms = snapshot.time.0.to_string();

        for s in &snapshot.stations {
            self.stations.write_record(&[
                generation.clone(),
                time_ms.clone(),
                s.id.clone(),
                s.band.clone(),
                s.load.to_string(),
                s.status.clone(),
                s.vendor.clone(),
                s.height.to_string(),
                s.x.to_string(),
                s.y.to_string(),
                s.z.to_string(),
            ])?;
        }
        for a in &snapshot.agvs {
            self.agvs.write_record(&[
                generation.clone(),
                time_ms.clone(),
                a.id.clone(),
                a.task.clone(),
                a.imei.clone(),
                a.speed.to_string(),
                a.sinr_db.to_string(),
                a.status.clone(),
                a.rsrp_dbm.to_string(),
                a.throughput_mbps.to_string(),
                a.battery_percentage.to_string(),
                a.x.to_string(),
                a.y.to_string(),
                a.z.to_string(),
                a.connected_bs.clone().unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.stations.flush()?;
        self.agvs.flush()?;
        self.queries.flush()?;
        Ok(())
    }
}
