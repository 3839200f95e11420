//! `ft-output`: graph-store persistence for `factory_twin`.
//!
//! The world exposes two hand-off points, both through
//! `ft_sim::SimObserver`: association changes and periodic snapshots.
//! [`GraphSyncObserver`] turns them into [`GraphStore`] calls.
//!
//! | Feature   | Backend     | Files created                                   |
//! |-----------|-------------|-------------------------------------------------|
//! | *(none)*  | CSV         | `stations.csv`, `agvs.csv`, `queries.csv`       |
//! | `sqlite`  | SQLite      | `graph.db`                                      |
//!
//! Any backend can be moved onto a worker thread with [`BackgroundStore`],
//! which is itself a `GraphStore` that never blocks.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ft_output::{BackgroundStore, CsvStore, GraphSyncObserver};
//!
//! let store = BackgroundStore::spawn(CsvStore::new(Path::new("./out"))?, 64)?;
//! let mut obs = GraphSyncObserver::new(store);
//! world.tick(dt, &mut obs);
//! let stats = obs.into_store().shutdown()?;
//! ```

pub mod background;
pub mod csv;
pub mod cypher;
pub mod error;
pub mod observer;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use background::{BackgroundStore, WorkerStats};
pub use csv::CsvStore;
pub use error::{OutputError, OutputResult};
pub use observer::GraphSyncObserver;
pub use store::GraphStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
