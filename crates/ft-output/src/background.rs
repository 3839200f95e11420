//! `BackgroundStore`: runs a [`GraphStore`] on its own thread.
//!
//! The tick loop hands work over a bounded channel and never waits.  When
//! the worker falls behind and the channel is full, new work is dropped and
//! reported as [`OutputError::QueueFull`]; the next periodic snapshot
//! carries the full state again, so nothing needs to be retried.

use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use ft_sim::WorldSnapshot;

use crate::store::GraphStore;
use crate::{OutputError, OutputResult};

enum Job {
    Query(String),
    Snapshot(Box<WorldSnapshot>),
    Flush,
}

impl Job {
    fn name(&self) -> &'static str {
        match self {
            Job::Query(_)    => "query",
            Job::Snapshot(_) => "snapshot",
            Job::Flush       => "flush",
        }
    }
}

/// What the worker did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub queries:   u64,
    pub snapshots: u64,
    /// Jobs the inner store returned an error for.
    pub failures:  u64,
}

/// Non-blocking front for a [`GraphStore`].
///
/// Dropping the handle closes the channel, lets the worker drain what is
/// already queued, flushes the store, and joins the thread.
pub struct BackgroundStore {
    tx:      Option<SyncSender<Job>>,
    worker:  Option<JoinHandle<WorkerStats>>,
    dropped: u64,
}

impl BackgroundStore {
    /// Move `store` onto a new worker thread with room for `capacity`
    /// pending jobs.
    pub fn spawn<S: GraphStore + 'static>(store: S, capacity: usize) -> OutputResult<Self> {
        let (tx, rx) = mpsc::sync_channel::<Job>(capacity.max(1));
        let worker = thread::Builder::new()
            .name("ft-graph-store".into())
            .spawn(move || run_worker(store, rx))
            .map_err(|e| OutputError::Spawn(e.to_string()))?;
        Ok(Self { tx: Some(tx), worker: Some(worker), dropped: 0 })
    }

    /// Jobs dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Close the queue, wait for the worker to finish, and return its
    /// counters.
    pub fn shutdown(mut self) -> OutputResult<WorkerStats> {
        self.join()
    }

    fn submit(&mut self, job: Job) -> OutputResult<()> {
        let Some(tx) = &self.tx else {
            return Err(OutputError::WorkerGone);
        };
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                self.dropped += 1;
                Err(OutputError::QueueFull { what: job.name() })
            }
            Err(TrySendError::Disconnected(_)) => Err(OutputError::WorkerGone),
        }
    }

    fn join(&mut self) -> OutputResult<WorkerStats> {
        self.tx = None;
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| OutputError::WorkerGone),
            None => Err(OutputError::WorkerGone),
        }
    }
}

impl GraphStore for BackgroundStore {
    fn run_query(&mut self, query: &str) -> OutputResult<()> {
        self.submit(Job::Query(query.to_owned()))
    }

    fn persist_snapshot(&mut self, snapshot: &WorldSnapshot) -> OutputResult<()> {
        self.submit(Job::Snapshot(Box::new(snapshot.clone())))
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.submit(Job::Flush)
    }
}

impl Drop for BackgroundStore {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.join() {
                tracing::error!(error = %e, "graph store worker panicked");
            }
        }
    }
}

fn run_worker<S: GraphStore>(mut store: S, rx: mpsc::Receiver<Job>) -> WorkerStats {
    let mut stats = WorkerStats::default();
    for job in rx {
        let result = match &job {
            Job::Query(q) => {
                stats.queries += 1;
                store.run_query(q)
            }
            Job::Snapshot(s) => {
                stats.snapshots += 1;
                store.persist_snapshot(s)
            }
            Job::Flush => store.flush(),
        };
        if let Err(e) = result {
            stats.failures += 1;
            tracing::error!(job = job.name(), error = %e, "graph store write failed");
        }
    }
    if let Err(e) = store.flush() {
        stats.failures += 1;
        tracing::error!(error = %e, "final graph store flush failed");
    }
    tracing::debug!(?stats, "graph store worker finished");
    stats
}
