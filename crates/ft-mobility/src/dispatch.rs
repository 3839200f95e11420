//! Task dispatch: choosing the next task and destination for an idle AGV.
//!
//! # Pluggability
//!
//! The controller asks a [`TaskPolicy`] for every new assignment.  The
//! default [`FactoryDispatch`] sends low-battery AGVs to the charger and
//! everything else to a random workstation.  A policy only picks; the
//! controller clamps the target and plans the route.

use ft_core::{AgentRng, FloorBounds, Vec3};

use crate::{Agv, AgvTask, MotionParams};

/// Destinations an AGV can be sent to.
#[derive(Debug, Clone, Default)]
pub struct Sites {
    /// Workstation centres, at floor level.
    pub workstations: Vec<Vec3>,
    /// Charging pad centre, if the floor has one.
    pub charger:      Option<Vec3>,
}

/// A dispatcher's decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskOrder {
    pub task:   AgvTask,
    pub target: Vec3,
}

/// Pluggable task selection.
///
/// Called with the AGV's own RNG so decisions are reproducible per AGV.
pub trait TaskPolicy: Send + Sync {
    fn next_task(
        &self,
        agv:    &Agv,
        sites:  &Sites,
        bounds: FloorBounds,
        params: &MotionParams,
        rng:    &mut AgentRng,
    ) -> TaskOrder;
}

/// Default factory dispatcher.
///
/// | Condition                                   | Task           | Target                 |
/// |---------------------------------------------|----------------|------------------------|
/// | battery < `low_battery_pct` and a charger   | `Charging`     | the charger            |
/// | otherwise, workstations exist               | random work    | random workstation     |
/// | otherwise                                   | random work    | random point on floor  |
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryDispatch;

impl TaskPolicy for FactoryDispatch {
    fn next_task(
        &self,
        agv:    &Agv,
        sites:  &Sites,
        bounds: FloorBounds,
        params: &MotionParams,
        rng:    &mut AgentRng,
    ) -> TaskOrder {
        if agv.battery < params.low_battery_pct {
            if let Some(charger) = sites.charger {
                tracing::warn!(agv = %agv.label, battery = agv.battery, "battery low, heading to charger");
                return TaskOrder { task: AgvTask::Charging, target: charger };
            }
        }

        let task = rng.choose(&AgvTask::WORK).copied().unwrap_or(AgvTask::TransportingParts);
        let target = match rng.choose(&sites.workstations) {
            Some(&ws) => ws,
            None => random_point(bounds, params.bounds_inset, rng),
        };
        TaskOrder { task, target }
    }
}

/// Uniform random point on the floor, at least `inset` from every edge.
pub fn random_point(bounds: FloorBounds, inset: f64, rng: &mut AgentRng) -> Vec3 {
    let p = Vec3::new(
        bounds.min_x + rng.gen_range(0.0..1.0) * bounds.width(),
        0.0,
        bounds.min_z + rng.gen_range(0.0..1.0) * bounds.depth(),
    );
    bounds.clamp(p, inset)
}
