//! `GraphSyncObserver<S>`: bridges `SimObserver` to a [`GraphStore`].

use ft_schedule::Generation;
use ft_sim::{HandoverEvent, SimObserver, WorldSnapshot};

use crate::cypher;
use crate::store::GraphStore;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that mirrors association changes and periodic
/// snapshots into a [`GraphStore`].
///
/// Store errors never reach the world: they are logged and counted.  Wrap
/// blocking stores in a [`BackgroundStore`][crate::BackgroundStore] before
/// handing them to this observer.
pub struct GraphSyncObserver<S: GraphStore> {
    store:    S,
    failures: u64,
}

impl<S: GraphStore> GraphSyncObserver<S> {
    pub fn new(store: S) -> Self {
        Self { store, failures: 0 }
    }

    /// Writes that failed or were dropped so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap the inner store (e.g. to shut a background worker down).
    pub fn into_store(self) -> S {
        self.store
    }

    fn record(&mut self, what: &str, result: OutputResult<()>) {
        match result {
            Ok(()) => {}
            Err(e @ OutputError::QueueFull { .. }) => {
                self.failures += 1;
                tracing::warn!(error = %e, "graph store is behind");
            }
            Err(e) => {
                self.failures += 1;
                tracing::error!(what, error = %e, "graph store write failed");
            }
        }
    }
}

impl<S: GraphStore> SimObserver for GraphSyncObserver<S> {
    fn on_handover(&mut self, event: &HandoverEvent) {
        let query = cypher::connect_agv(&event.agv_label, &event.to);
        let result = self.store.run_query(&query);
        self.record("association", result);
    }

    fn on_snapshot(&mut self, snapshot: &WorldSnapshot) {
        let result = self.store.persist_snapshot(snapshot);
        self.record("snapshot", result);
    }

    fn on_reset(&mut self, generation: Generation) {
        tracing::info!(%generation, "world reset, graph store keeps previous nodes until next snapshot");
        let result = self.store.flush();
        self.record("flush", result);
    }
}
