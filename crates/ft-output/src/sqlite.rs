//! SQLite graph-store backend (feature `sqlite`).
//!
//! Creates `graph.db` in the configured output directory.  Station and AGV
//! rows are upserted by id, so each table holds the latest state of every
//! node, the way `MERGE ... SET` does in a graph database.  The serving
//! station lives in `agv.connected_bs`; statements from `run_query` are
//! appended to `query_log`.

use std::path::Path;

use ft_sim::WorldSnapshot;
use rusqlite::Connection;

use crate::store::GraphStore;
use crate::OutputResult;

/// Writes the graph view to an SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) `graph.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("graph.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS gnodeb (
                 id         TEXT PRIMARY KEY,
                 generation INTEGER NOT NULL,
                 time_ms    INTEGER NOT NULL,
                 band       TEXT NOT NULL,
                 load       INTEGER NOT NULL,
                 status     TEXT NOT NULL,
                 vendor     TEXT NOT NULL,
                 height     REAL NOT NULL,
                 x REAL NOT NULL, y REAL NOT NULL, z REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS agv (
                 id                 TEXT PRIMARY KEY,
                 generation         INTEGER NOT NULL,
                 time_ms            INTEGER NOT NULL,
                 task               TEXT NOT NULL,
                 imei               TEXT NOT NULL,
                 speed              REAL NOT NULL,
                 sinr_db            REAL NOT NULL,
                 status             TEXT NOT NULL,
                 rsrp_dbm           REAL NOT NULL,
                 throughput_mbps    REAL NOT NULL,
                 battery_percentage REAL NOT NULL,
                 x REAL NOT NULL, y REAL NOT NULL, z REAL NOT NULL,
                 connected_bs       TEXT
             );
             CREATE TABLE IF NOT EXISTS query_log (
                 seq   INTEGER PRIMARY KEY AUTOINCREMENT,
                 query TEXT NOT NULL
             );",
        )?;

        Ok(Self { conn })
    }

    /// Direct access for inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl GraphStore for SqliteStore {
    fn run_query(&mut self, query: &str) -> OutputResult<()> {
        self.conn.execute("INSERT INTO query_log (query) VALUES (?1)", [query])?;
        Ok(())
    }

    fn persist_snapshot(&mut self, snapshot: &WorldSnapshot) -> OutputResult<()> {
        let generation = snapshot.generation.0 as i64;
        let time_ms = snapshot.time.0 as i64;
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO gnodeb \
                 (id, generation, time_ms, band, load, status, vendor, height, x, y, z) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for s in &snapshot.stations {
                stmt.execute(rusqlite::params![
                    s.id, generation, time_ms, s.band, s.load as i64, s.status, s.vendor,
                    s.height, s.x, s.y, s.z,
                ])?;
            }
        }
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO agv \
                 (id, generation, time_ms, task, imei, speed, sinr_db, status, rsrp_dbm, \
                  throughput_mbps, battery_percentage, x, y, z, connected_bs) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;
            for a in &snapshot.agvs {
                stmt.execute(rusqlite::params![
                    a.id, generation, time_ms, a.task, a.imei, a.speed, a.sinr_db, a.status,
                    a.rsrp_dbm, a.throughput_mbps, a.battery_percentage, a.x, a.y, a.z,
                    a.connected_bs,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
