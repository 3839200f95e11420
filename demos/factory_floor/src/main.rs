//! factory_floor: runs the factory twin headless and writes the graph view.
//!
//! Builds a world from a TOML config (or the defaults), drives it with a
//! fixed time step, mirrors every cell association and periodic snapshot to
//! a graph store on a background thread, and prints a link summary at the
//! end.
//!
//! Run with:
//!   cargo run -p factory_floor --release -- --seconds 120 --out output/floor
//!   RUST_LOG=ft_sim=debug cargo run -p factory_floor -- --config floor.toml

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ft_output::{BackgroundStore, CsvStore, GraphStore, GraphSyncObserver};
use ft_sim::{HandoverEvent, SimObserver, World, WorldConfig, WorldSnapshot};
use ft_core::SimTime;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Jobs the graph-store worker may have pending before new ones are dropped.
const STORE_QUEUE:  usize = 1_024;
/// Progress line every this many simulated seconds.
const REPORT_EVERY: u64   = 30;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "factory_floor", about = "Headless factory floor digital twin")]
struct Args {
    /// TOML world config; defaults are used for anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Time step in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Output directory for the graph store.
    #[arg(long, default_value = "output/factory_floor")]
    out: PathBuf,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Write to SQLite instead of CSV.
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    sqlite: bool,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

// ── Observer wrapper ──────────────────────────────────────────────────────────

/// Counts events on the way through to the graph sync.
struct CountingObserver<S: GraphStore> {
    inner:       GraphSyncObserver<S>,
    handovers:   usize,
    snapshots:   usize,
    next_report: u64,
}

impl<S: GraphStore> CountingObserver<S> {
    fn new(inner: GraphSyncObserver<S>) -> Self {
        Self { inner, handovers: 0, snapshots: 0, next_report: REPORT_EVERY }
    }
}

impl<S: GraphStore> SimObserver for CountingObserver<S> {
    fn on_tick_end(&mut self, time: SimTime) {
        let secs = time.0 / 1_000;
        if secs >= self.next_report {
            tracing::info!(t = secs, handovers = self.handovers, "progress");
            self.next_report = secs + REPORT_EVERY;
        }
    }

    fn on_handover(&mut self, event: &HandoverEvent) {
        self.handovers += 1;
        self.inner.on_handover(event);
    }

    fn on_snapshot(&mut self, snapshot: &WorldSnapshot) {
        self.snapshots += 1;
        self.inner.on_snapshot(snapshot);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.dt > 0.0 && args.dt.is_finite(), "--dt must be a positive number");
    anyhow::ensure!(args.seconds >= 0.0 && args.seconds.is_finite(), "--seconds must be non-negative");

    // 1. Config.
    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    // 2. World.
    let mut world = World::new(config).context("building world")?;
    world.resume();
    println!(
        "Floor {:.0} m | {} AGVs | {} gNodeBs | {} obstacles | seed {}",
        world.config().factory_size,
        world.agvs().len(),
        world.stations().len(),
        world.layout().obstacles.len(),
        world.config().seed,
    );

    // 3. Graph store.
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let store = open_store(&args)?;
    let bg = BackgroundStore::spawn(store, STORE_QUEUE)?;
    let mut obs = CountingObserver::new(GraphSyncObserver::new(bg));

    // 4. Run.
    let steps = (args.seconds / args.dt).round() as u64;
    let t0 = Instant::now();
    for _ in 0..steps {
        world.tick(args.dt, &mut obs);
    }
    let elapsed = t0.elapsed();

    // 5. Drain the store.
    let failures = obs.inner.failures();
    let bg = obs.inner.into_store();
    let dropped = bg.dropped();
    let worker = bg.shutdown()?;

    // 6. Summary.
    let stats = world.stats();
    println!("Simulated {:.1} s in {:.3} s", world.now().0 as f64 / 1_000.0, elapsed.as_secs_f64());
    println!("  handovers       : {}", obs.handovers);
    println!("  snapshots       : {}", obs.snapshots);
    println!("  store writes    : {} queries, {} snapshots", worker.queries, worker.snapshots);
    println!("  store problems  : {} errors ({} dropped), {} failed writes", failures, dropped, worker.failures);
    println!(
        "  links           : {}/{} connected, avg RSRP {:.1} dBm, avg SINR {:.1} dB, {:.1} Mbps total",
        stats.connected_ues,
        stats.total_ues,
        stats.avg_rsrp_dbm,
        stats.avg_sinr_db,
        stats.total_throughput_mbps,
    );
    println!();

    println!("{:<10} {:<20} {:<10} {:<10} {:>8}", "AGV", "Task", "Status", "Serving", "SINR");
    println!("{}", "-".repeat(62));
    let snapshot = world.snapshot();
    for agv in &snapshot.agvs {
        println!(
            "{:<10} {:<20} {:<10} {:<10} {:>8.1}",
            agv.id,
            agv.task,
            agv.status,
            agv.connected_bs.as_deref().unwrap_or("-"),
            agv.sinr_db,
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn open_store(args: &Args) -> Result<Box<dyn GraphStore>> {
    Ok(Box::new(CsvStore::new(&args.out)?))
}

#[cfg(feature = "sqlite")]
fn open_store(args: &Args) -> Result<Box<dyn GraphStore>> {
    if args.sqlite {
        return Ok(Box::new(ft_output::SqliteStore::new(&args.out)?));
    }
    Ok(Box::new(CsvStore::new(&args.out)?))
}
