//! The `World` context and its tick loop.

use ft_core::{Aabb, AgentRng, AgvId, FloorBounds, SimClock, SimRng, SimTime, StationId, Vec3};
use ft_mobility::{Agv, AgvController, Directive, FactoryDispatch, Sites, TaskPolicy};
use ft_radio::{LinkModel, Signal, StationSite};
use ft_schedule::{Generation, Wake, WakeQueue};
use ft_spatial::{AStarPlanner, FloorPlan, ObstacleSet, PathPlanner, RIDE_HEIGHT};

use crate::station::{default_positions, place_stations};
use crate::{
    BaseStation, FactoryLayout, HandoverEvent, SimError, SimObserver, SimResult, WorldConfig,
    WorldSnapshot, WorldStats,
};

/// Attempts at finding a free spawn cell before falling back to the last
/// candidate.
const SPAWN_ATTEMPTS: usize = 64;

// ── Overrides ─────────────────────────────────────────────────────────────────

/// Fixed placements that survive resets.  Set through
/// [`WorldBuilder`][crate::WorldBuilder].
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) station_positions: Option<Vec<Vec3>>,
    pub(crate) spawn_points:      Option<Vec<Vec3>>,
}

// ── Population ────────────────────────────────────────────────────────────────

/// Everything a reset replaces.
struct Population {
    floor:         FloorPlan,
    layout:        FactoryLayout,
    sites:         Sites,
    stations:      Vec<BaseStation>,
    station_sites: Vec<StationSite>,
    agvs:          Vec<Agv>,
    rngs:          Vec<AgentRng>,
    jitter:        SimRng,
    wake_queue:    WakeQueue,
}

impl Population {
    fn generate<P: PathPlanner, T: TaskPolicy>(
        config:     &WorldConfig,
        overrides:  &Overrides,
        generation: Generation,
        controller: &AgvController<P, T>,
    ) -> SimResult<Self> {
        let mut master = SimRng::new(config.seed).child(generation.0 as u64);
        let mut layout_rng = master.child(1);
        let mut station_rng = master.child(2);
        let mut spawn_rng = master.child(3);
        let jitter = master.child(4);

        let layout = FactoryLayout::generate(config, &mut layout_rng);
        let bounds = FloorBounds::centered(config.factory_size);
        let mut floor = FloorPlan::new(bounds, config.cell_size, layout.collidable())?;
        let sites = layout.sites();

        let positions = match &overrides.station_positions {
            Some(p) => p.clone(),
            None => default_positions(config.station_count, config.factory_size),
        };
        let stations = place_stations(&positions, &mut station_rng);
        let station_sites = stations.iter().map(BaseStation::site).collect();

        let mut agvs = Vec::with_capacity(config.agv_count);
        let mut rngs = Vec::with_capacity(config.agv_count);
        let mut wake_queue = WakeQueue::new();
        let link_floor = config.link_floor();
        for i in 0..config.agv_count {
            let id = AgvId(i as u32);
            let fixed = overrides.spawn_points.as_ref().and_then(|s| s.get(i)).copied();
            let position = match fixed {
                Some(p) => {
                    let mut p = bounds.clamp(p, config.motion.bounds_inset);
                    p.y = RIDE_HEIGHT;
                    p
                }
                None => spawn_position(config, &floor, &mut spawn_rng),
            };
            let imei = format!("35824005{}", spawn_rng.gen_range(1_000_000u32..=9_999_999));
            let speed = 3.0 + spawn_rng.unit() * 2.0;
            let mut agv = Agv::new(id, format!("AGV-{}", 1001 + i), imei, position, speed, link_floor);
            let mut rng = AgentRng::new(config.seed, id, generation.0 as u64);

            let directive = controller.assign_task(&mut agv, &mut floor, &sites, &mut rng);
            schedule(&mut wake_queue, generation, &agv, SimTime::ZERO, directive);

            agvs.push(agv);
            rngs.push(rng);
        }

        Ok(Self { floor, layout, sites, stations, station_sites, agvs, rngs, jitter, wake_queue })
    }
}

/// Random free position within the spawn margin.
fn spawn_position(config: &WorldConfig, floor: &FloorPlan, rng: &mut SimRng) -> Vec3 {
    let bound = config.clamp_bound();
    let mut candidate = Vec3::new(0.0, RIDE_HEIGHT, 0.0);
    for _ in 0..SPAWN_ATTEMPTS {
        candidate = Vec3::new(
            rng.gen_range(-bound..=bound),
            RIDE_HEIGHT,
            rng.gen_range(-bound..=bound),
        );
        if floor.grid().is_free_at(candidate) {
            return candidate;
        }
    }
    tracing::warn!(position = %candidate, "no free spawn cell found, spawning on an obstacle");
    candidate
}

/// Turn a controller directive into a wake-queue entry.
fn schedule(queue: &mut WakeQueue, generation: Generation, agv: &Agv, now: SimTime, directive: Directive) {
    if let Directive::AssignAfter { delay_ms } = directive {
        queue.push(
            now.after_ms(delay_ms),
            Wake { agv: agv.id, generation, token: agv.assign_token },
        );
    }
}

/// Received power at every AGV from every station.
fn measure_links(
    links:     &LinkModel,
    agvs:      &[Agv],
    stations:  &[StationSite],
    obstacles: &ObstacleSet,
) -> Vec<Vec<Signal>> {
    #[cfg(not(feature = "parallel"))]
    {
        agvs.iter()
            .map(|agv| links.measure(agv.position, stations, obstacles))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        agvs.par_iter()
            .map(|agv| links.measure(agv.position, stations, obstacles))
            .collect()
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// One self-contained simulation instance.
///
/// `World<P, T>` owns the floor, stations, AGVs and the wake queue, and
/// drives the per-frame tick:
///
/// 1. **Wakes**: drain entries due at the current time; entries from an
///    older generation or carrying a stale assignment token are dropped.
/// 2. **Motion**: [`AgvController::update`] for each AGV, in id order.
///    Deferred work comes back as a [`Directive`] and is queued.
/// 3. **Links** (measurement optionally parallel with the `parallel`
///    feature): received power from every station, then serving-cell
///    selection and link quality, sequentially in id order.
/// 4. **Snapshot**: every `snapshot_interval_ms` of running time.
///
/// Nothing is global; independent worlds can run side by side.  Create via
/// [`World::new`] or [`WorldBuilder`][crate::WorldBuilder].
pub struct World<P: PathPlanner = AStarPlanner, T: TaskPolicy = FactoryDispatch> {
    config:        WorldConfig,
    generation:    Generation,
    clock:         SimClock,
    paused:        bool,

    floor:         FloorPlan,
    layout:        FactoryLayout,
    sites:         Sites,
    stations:      Vec<BaseStation>,
    /// Cached `(id, position)` pairs handed to the link model.
    station_sites: Vec<StationSite>,

    agvs:          Vec<Agv>,
    /// Per-AGV RNGs, separate from `agvs` for the split-borrow pattern.
    rngs:          Vec<AgentRng>,
    wake_queue:    WakeQueue,

    controller:    AgvController<P, T>,
    links:         LinkModel,
    jitter:        SimRng,
    last_snapshot: SimTime,
    overrides:     Overrides,
}

impl World {
    /// Build a world with the default planner and dispatcher.
    pub fn new(config: WorldConfig) -> SimResult<Self> {
        crate::WorldBuilder::new(config).build()
    }
}

impl<P: PathPlanner, T: TaskPolicy> World<P, T> {
    pub(crate) fn assemble(
        config:     WorldConfig,
        controller: AgvController<P, T>,
        overrides:  Overrides,
    ) -> SimResult<Self> {
        let generation = Generation::default();
        let pop = Population::generate(&config, &overrides, generation, &controller)?;
        tracing::info!(
            %generation,
            agvs = pop.agvs.len(),
            stations = pop.stations.len(),
            obstacles = pop.layout.obstacles.len(),
            "world created"
        );
        Ok(Self {
            links:         LinkModel::new(config.radio.clone()),
            paused:        config.start_paused,
            config,
            generation,
            clock:         SimClock::new(),
            floor:         pop.floor,
            layout:        pop.layout,
            sites:         pop.sites,
            stations:      pop.stations,
            station_sites: pop.station_sites,
            agvs:          pop.agvs,
            rngs:          pop.rngs,
            wake_queue:    pop.wake_queue,
            controller,
            jitter:        pop.jitter,
            last_snapshot: SimTime::ZERO,
            overrides,
        })
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the world by `dt` seconds.
    ///
    /// Returns `false` without touching any state while paused or when `dt`
    /// is zero, negative or not finite.
    pub fn tick<O: SimObserver + ?Sized>(&mut self, dt: f64, observer: &mut O) -> bool {
        if self.paused || !self.clock.advance(dt) {
            return false;
        }
        let now = self.clock.now();
        observer.on_tick_start(now);

        self.process_wakes(now);
        self.move_agvs(now, dt);
        self.update_links(now, observer);

        let interval = self.config.snapshot_interval_ms;
        if interval > 0 && now.since(self.last_snapshot) >= interval {
            self.last_snapshot = now;
            observer.on_snapshot(&self.snapshot());
        }

        observer.on_tick_end(now);
        true
    }

    fn process_wakes(&mut self, now: SimTime) {
        for wake in self.wake_queue.drain_due(now) {
            if wake.generation != self.generation {
                tracing::trace!(agv = %wake.agv, generation = %wake.generation, "dropping wake from old generation");
                continue;
            }
            let i = wake.agv.index();
            let (Some(agv), Some(rng)) = (self.agvs.get_mut(i), self.rngs.get_mut(i)) else {
                continue;
            };
            if agv.assign_token != wake.token {
                continue;
            }
            let directive = self.controller.assign_task(agv, &mut self.floor, &self.sites, rng);
            schedule(&mut self.wake_queue, self.generation, agv, now, directive);
        }
    }

    fn move_agvs(&mut self, now: SimTime, dt: f64) {
        for (agv, rng) in self.agvs.iter_mut().zip(self.rngs.iter_mut()) {
            let directive = self.controller.update(agv, &mut self.floor, &self.sites, rng, dt);
            schedule(&mut self.wake_queue, self.generation, agv, now, directive);
        }
    }

    fn update_links<O: SimObserver + ?Sized>(&mut self, now: SimTime, observer: &mut O) {
        let signals = measure_links(&self.links, &self.agvs, &self.station_sites, self.floor.obstacles());

        for station in &mut self.stations {
            station.connected_ues.clear();
        }

        for (agv, signals) in self.agvs.iter_mut().zip(&signals) {
            let previous = agv.connected_bs;
            let report = self.links.evaluate(previous, signals, &mut self.jitter);
            agv.connected_bs = report.serving();
            agv.rsrp_dbm = report.rsrp_dbm;
            agv.sinr_db = report.sinr_db;
            agv.throughput_mbps = report.throughput_mbps;

            let Some(serving) = report.serving() else {
                continue;
            };
            if report.selection.is_change() {
                let label = |id: StationId| self.stations.get(id.index()).map(|s| s.label.clone());
                let event = HandoverEvent {
                    time:      now,
                    agv:       agv.id,
                    agv_label: agv.label.clone(),
                    from:      previous.and_then(label),
                    to:        label(serving).unwrap_or_default(),
                    rsrp_dbm:  report.rsrp_dbm,
                };
                tracing::debug!(
                    agv = %event.agv_label,
                    from = event.from.as_deref().unwrap_or("-"),
                    to = %event.to,
                    rsrp_dbm = event.rsrp_dbm,
                    "serving cell changed"
                );
                observer.on_handover(&event);
            }
            if let Some(station) = self.stations.get_mut(serving.index()) {
                station.connected_ues.push(agv.id);
            }
        }
    }

    // ── Reset and parameter changes ───────────────────────────────────────

    /// Discard the whole world and build the next generation from the
    /// current config.  Every pending wake is dropped with the old queue.
    /// On error the current generation is kept as it was.
    pub fn reset<O: SimObserver + ?Sized>(&mut self, observer: &mut O) -> SimResult<()> {
        let generation = self.generation.next();
        let pop = Population::generate(&self.config, &self.overrides, generation, &self.controller)?;

        self.generation = generation;
        self.clock = SimClock::new();
        self.last_snapshot = SimTime::ZERO;
        self.paused = self.config.start_paused;
        self.floor = pop.floor;
        self.layout = pop.layout;
        self.sites = pop.sites;
        self.stations = pop.stations;
        self.station_sites = pop.station_sites;
        self.agvs = pop.agvs;
        self.rngs = pop.rngs;
        self.jitter = pop.jitter;
        self.wake_queue = pop.wake_queue;

        tracing::info!(
            %generation,
            agvs = self.agvs.len(),
            stations = self.stations.len(),
            obstacles = self.layout.obstacles.len(),
            "world reset"
        );
        observer.on_reset(generation);
        Ok(())
    }

    /// Replace the config and reset.  An invalid config, or one the world
    /// cannot be generated from, leaves the world untouched.
    pub fn set_config<O: SimObserver + ?Sized>(
        &mut self,
        config:   WorldConfig,
        observer: &mut O,
    ) -> SimResult<()> {
        config.validate()?;
        let motion = std::mem::replace(&mut self.controller.params, config.motion.clone());
        let previous = std::mem::replace(&mut self.config, config);
        if let Err(e) = self.reset(observer) {
            self.controller.params = motion;
            self.config = previous;
            return Err(e);
        }
        self.links = LinkModel::new(self.config.radio.clone());
        Ok(())
    }

    /// Change the floor size without a reset.  AGVs and targets outside the
    /// new bounds are pulled back in, and moved AGVs replan.
    pub fn resize_floor(&mut self, factory_size: f64) -> SimResult<()> {
        let mut config = self.config.clone();
        config.factory_size = factory_size;
        config.validate()?;
        let bounds = FloorBounds::centered(factory_size);
        self.floor.set_bounds(bounds)?;
        self.config = config;

        let now = self.clock.now();
        for (agv, rng) in self.agvs.iter_mut().zip(self.rngs.iter_mut()) {
            if !self.controller.confine(agv, bounds) {
                continue;
            }
            tracing::debug!(agv = %agv.label, position = %agv.position, "confined to resized floor");
            let directive = self.controller.replan(agv, &mut self.floor, &self.sites, rng);
            schedule(&mut self.wake_queue, self.generation, agv, now, directive);
        }
        Ok(())
    }

    /// Add a collidable box.  The grid is rebuilt immediately; AGVs route
    /// around it on their next plan or replan.
    pub fn add_obstacle(&mut self, body: Aabb) {
        self.floor.add_obstacle(body);
        self.layout.obstacles.push(body);
    }

    /// Send an AGV to `target`.  It holds there on arrival.
    pub fn command_agv(&mut self, id: AgvId, target: Vec3) -> SimResult<()> {
        if !target.is_finite() {
            return Err(SimError::Config(format!("command target {target} is not finite")));
        }
        let i = id.index();
        let (Some(agv), Some(rng)) = (self.agvs.get_mut(i), self.rngs.get_mut(i)) else {
            return Err(SimError::UnknownAgv(id));
        };
        let directive = self.controller.direct(agv, target, &mut self.floor, rng);
        schedule(&mut self.wake_queue, self.generation, agv, self.clock.now(), directive);
        Ok(())
    }

    // ── Pause ─────────────────────────────────────────────────────────────

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ── Views ─────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self.generation, self.clock.now(), &self.stations, &self.agvs)
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats::of(&self.agvs, self.config.link_floor())
    }

    pub fn config(&self) -> &WorldConfig { &self.config }
    pub fn generation(&self) -> Generation { self.generation }
    pub fn now(&self) -> SimTime { self.clock.now() }
    pub fn clock(&self) -> &SimClock { &self.clock }
    pub fn floor(&self) -> &FloorPlan { &self.floor }
    pub fn layout(&self) -> &FactoryLayout { &self.layout }
    pub fn sites(&self) -> &Sites { &self.sites }
    pub fn stations(&self) -> &[BaseStation] { &self.stations }
    pub fn agvs(&self) -> &[Agv] { &self.agvs }
    pub fn wake_queue(&self) -> &WakeQueue { &self.wake_queue }

    pub fn agv(&self, id: AgvId) -> Option<&Agv> {
        self.agvs.get(id.index())
    }
}
