//! Per-tick AGV state machine.
//!
//! # Tick order
//!
//! [`AgvController::update`] runs, for one AGV and one accepted delta:
//!
//! 1. **Battery**: drain, or charge while parked at the pad.  A full
//!    battery ends the charging run with an immediate reassignment.
//! 2. **Waypoint**: if the current waypoint is within reach, advance the
//!    index; past the last one the AGV has arrived.
//! 3. **Lookahead**: cast a ray toward the waypoint.  A hit accumulates
//!    stuck time; past the limit the route is replanned.
//! 4. **Move**: step toward the waypoint and clamp inside the floor.
//!
//! Planning failures never stall an AGV for good: each one ends in either a
//! deferred retry ([`Directive::AssignAfter`]) or an immediate new task.

use ft_core::{AgentRng, FloorBounds, Ray, Vec3};
use ft_spatial::{AStarPlanner, CollisionQuery, FloorPlan, PathPlanner, RIDE_HEIGHT};

use crate::dispatch::{FactoryDispatch, Sites, TaskOrder, TaskPolicy};
use crate::{Agv, AgvStatus, AgvTask, MobilityResult, MotionParams};

/// Deferred work the caller must schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Nothing to schedule.
    None,
    /// Run `assign_task` for this AGV after `delay_ms` of simulated time,
    /// unless it has been reassigned in the meantime.
    AssignAfter { delay_ms: u64 },
}

/// Drives AGVs along planned routes.
///
/// # Type parameters
///
/// `P` is the grid search and `T` the task dispatcher.  Both are fixed at
/// compile time; the defaults are [`AStarPlanner`] and [`FactoryDispatch`].
pub struct AgvController<P: PathPlanner = AStarPlanner, T: TaskPolicy = FactoryDispatch> {
    pub planner: P,
    pub policy:  T,
    pub params:  MotionParams,
}

impl Default for AgvController {
    fn default() -> Self {
        Self::new(AStarPlanner::default(), FactoryDispatch, MotionParams::default())
    }
}

impl<P: PathPlanner, T: TaskPolicy> AgvController<P, T> {
    pub fn new(planner: P, policy: T, params: MotionParams) -> Self {
        Self { planner, policy, params }
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Ask the policy for a new task and plan a route to it.
    pub fn assign_task(
        &self,
        agv:   &mut Agv,
        floor: &mut FloorPlan,
        sites: &Sites,
        rng:   &mut AgentRng,
    ) -> Directive {
        let order = self.policy.next_task(agv, sites, floor.bounds(), &self.params, rng);
        self.dispatch(agv, order, floor, rng)
    }

    /// Send the AGV to `target` as a [`AgvTask::Directed`] task.  It holds
    /// there on arrival instead of picking new work.
    pub fn direct(
        &self,
        agv:    &mut Agv,
        target: Vec3,
        floor:  &mut FloorPlan,
        rng:    &mut AgentRng,
    ) -> Directive {
        self.dispatch(agv, TaskOrder { task: AgvTask::Directed, target }, floor, rng)
    }

    fn dispatch(
        &self,
        agv:   &mut Agv,
        order: TaskOrder,
        floor: &mut FloorPlan,
        rng:   &mut AgentRng,
    ) -> Directive {
        agv.assign_token += 1;
        agv.at_charger = false;
        agv.stuck_secs = 0.0;
        agv.task = order.task;
        agv.status = AgvStatus::Moving;

        let target = self.confine_point(order.target, floor.bounds());
        agv.target = Some(target);

        floor.rebuild_grid();
        match self.route(floor, agv.position, target) {
            Ok(path) => {
                tracing::debug!(agv = %agv.label, task = %agv.task, %target, waypoints = path.len(), "task assigned");
                agv.path = Some(path);
                agv.path_index = 0;
                Directive::None
            }
            Err(e) => {
                agv.path = None;
                agv.path_index = 0;
                let delay_ms = pick_delay(self.params.retry_delay_ms, rng);
                tracing::warn!(agv = %agv.label, error = %e, delay_ms, "path not found, retrying later");
                Directive::AssignAfter { delay_ms }
            }
        }
    }

    /// Plan from `from` to `target`.  When the target lies in the final
    /// cell, that cell's centre is replaced by the target itself so the AGV
    /// ends on the point it was sent to.
    fn route(&self, floor: &FloorPlan, from: Vec3, target: Vec3) -> MobilityResult<Vec<Vec3>> {
        let path = floor.plan(&self.planner, from, target)?;
        let target_cell = floor.grid().world_to_grid(target);
        let mut waypoints = path.waypoints;
        if path.cells.last() == Some(&target_cell) {
            if let Some(last) = waypoints.last_mut() {
                *last = target;
            }
        }
        Ok(waypoints)
    }

    // ── Per-tick update ───────────────────────────────────────────────────

    /// Advance one AGV by `dt` seconds.  Non-positive or non-finite deltas
    /// do nothing.
    pub fn update(
        &self,
        agv:   &mut Agv,
        floor: &mut FloorPlan,
        sites: &Sites,
        rng:   &mut AgentRng,
        dt:    f64,
    ) -> Directive {
        if !(dt > 0.0 && dt.is_finite()) {
            return Directive::None;
        }
        if let Some(directive) = self.update_battery(agv, floor, sites, rng, dt) {
            return directive;
        }
        if agv.target.is_none() {
            return Directive::None;
        }
        self.follow_path(agv, floor, sites, rng, dt)
    }

    fn update_battery(
        &self,
        agv:   &mut Agv,
        floor: &mut FloorPlan,
        sites: &Sites,
        rng:   &mut AgentRng,
        dt:    f64,
    ) -> Option<Directive> {
        if !agv.task.is_charging() {
            agv.battery = (agv.battery - self.params.drain_pct_per_sec * dt).clamp(0.0, 100.0);
            return None;
        }
        if !agv.at_charger {
            return None;
        }
        agv.battery = (agv.battery + self.params.charge_pct_per_sec * dt).clamp(0.0, 100.0);
        if agv.battery < 100.0 {
            return None;
        }
        tracing::info!(agv = %agv.label, "fully charged");
        agv.at_charger = false;
        Some(self.assign_task(agv, floor, sites, rng))
    }

    fn follow_path(
        &self,
        agv:   &mut Agv,
        floor: &mut FloorPlan,
        sites: &Sites,
        rng:   &mut AgentRng,
        dt:    f64,
    ) -> Directive {
        // Target without a path: waiting on a scheduled retry.
        let Some(waypoint) = agv.current_waypoint() else {
            return Directive::None;
        };
        let cell = floor.cell_size();

        let to_waypoint = (waypoint - agv.position).flatten();
        let dist = to_waypoint.length();
        if dist < self.params.waypoint_reach_cells * cell {
            agv.path_index += 1;
            let len = agv.path.as_ref().map_or(0, Vec::len);
            if agv.path_index >= len {
                return self.arrive(agv, rng);
            }
            return Directive::None;
        }

        let Some(ray) = Ray::new(agv.position, to_waypoint) else {
            return Directive::None;
        };
        let lookahead = (self.params.lookahead_cells * cell).min(dist);
        if floor.obstacles().nearest_hit(&ray, lookahead).is_some() {
            agv.stuck_secs += dt;
            if agv.stuck_secs > self.params.stuck_secs {
                return self.replan(agv, floor, sites, rng);
            }
            return Directive::None;
        }

        agv.stuck_secs = 0.0;
        let step = (agv.speed * dt).min(dist);
        agv.position += ray.dir * step;
        agv.heading = ray.dir.yaw();
        agv.position = floor.bounds().clamp(agv.position, self.params.bounds_inset);
        Directive::None
    }

    fn arrive(&self, agv: &mut Agv, rng: &mut AgentRng) -> Directive {
        let task = agv.task;
        agv.clear_route();
        tracing::debug!(agv = %agv.label, %task, position = %agv.position, "destination reached");
        match task {
            AgvTask::Charging => {
                agv.at_charger = true;
                Directive::None
            }
            AgvTask::Directed => Directive::None,
            _ => Directive::AssignAfter { delay_ms: pick_delay(self.params.arrival_delay_ms, rng) },
        }
    }

    /// Plan again from the current position to the current target.  If no
    /// route exists the AGV is given a new task instead.
    pub fn replan(
        &self,
        agv:   &mut Agv,
        floor: &mut FloorPlan,
        sites: &Sites,
        rng:   &mut AgentRng,
    ) -> Directive {
        agv.stuck_secs = 0.0;
        let Some(target) = agv.target else {
            return Directive::None;
        };
        tracing::debug!(agv = %agv.label, "obstruction on path, replanning");
        floor.rebuild_grid();
        match self.route(floor, agv.position, target) {
            Ok(path) => {
                agv.path = Some(path);
                agv.path_index = 0;
                Directive::None
            }
            Err(e) => {
                tracing::warn!(agv = %agv.label, error = %e, "cannot replan, assigning new task");
                self.assign_task(agv, floor, sites, rng)
            }
        }
    }

    // ── Bounds ────────────────────────────────────────────────────────────

    fn confine_point(&self, p: Vec3, bounds: FloorBounds) -> Vec3 {
        let mut p = bounds.clamp(p, self.params.bounds_inset);
        p.y = RIDE_HEIGHT;
        p
    }

    /// Pull the AGV and its target back inside `bounds`, e.g. after the
    /// floor shrank.  Returns `true` if anything moved.
    pub fn confine(&self, agv: &mut Agv, bounds: FloorBounds) -> bool {
        let inset = self.params.bounds_inset;
        let before = (agv.position, agv.target);
        agv.position = bounds.clamp(agv.position, inset);
        agv.target = agv.target.map(|t| bounds.clamp(t, inset));
        before != (agv.position, agv.target)
    }
}

/// Uniform delay in the inclusive range `(lo, hi)`.
fn pick_delay((lo, hi): (u64, u64), rng: &mut AgentRng) -> u64 {
    if lo >= hi { lo } else { rng.gen_range(lo..=hi) }
}
