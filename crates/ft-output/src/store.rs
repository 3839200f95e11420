//! The `GraphStore` trait implemented by all backends.

use ft_sim::WorldSnapshot;

use crate::OutputResult;

/// External storage for the world's graph view: `gNodeB` and `AGV` nodes
/// joined by `CONNECTED_TO` relationships.
///
/// Calls may block on I/O.  The tick loop never calls a store directly; it
/// goes through [`BackgroundStore`][crate::BackgroundStore] so a slow or
/// failing store cannot stall the simulation.
pub trait GraphStore: Send {
    /// Execute an opaque query statement.
    fn run_query(&mut self, query: &str) -> OutputResult<()>;

    /// Upsert every station and AGV in `snapshot`.
    fn persist_snapshot(&mut self, snapshot: &WorldSnapshot) -> OutputResult<()>;

    /// Flush buffered writes.  Idempotent.
    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

impl<S: GraphStore + ?Sized> GraphStore for Box<S> {
    fn run_query(&mut self, query: &str) -> OutputResult<()> {
        (**self).run_query(query)
    }

    fn persist_snapshot(&mut self, snapshot: &WorldSnapshot) -> OutputResult<()> {
        (**self).persist_snapshot(snapshot)
    }

    fn flush(&mut self) -> OutputResult<()> {
        (**self).flush()
    }
}
