//! Fluent builder for constructing a [`World`].

use ft_core::Vec3;
use ft_mobility::{AgvController, FactoryDispatch, TaskPolicy};
use ft_spatial::{AStarPlanner, PathPlanner};

use crate::world::Overrides;
use crate::{SimError, SimResult, World, WorldConfig};

/// Fluent builder for [`World<P, T>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                                    |
/// |---------------------------|--------------------------------------------|
/// | `.planner(p)`             | `AStarPlanner::default()`                  |
/// | `.policy(t)`              | `FactoryDispatch`                          |
/// | `.station_positions(v)`   | quarter grid, then a ring                  |
/// | `.spawn_points(v)`        | random free cells                          |
///
/// Station positions and spawn points are kept for the lifetime of the
/// world and reapplied on every reset.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = WorldBuilder::new(config)
///     .station_positions(vec![Vec3::ZERO])
///     .spawn_points(vec![Vec3::new(40.0, 0.0, 40.0)])
///     .build()?;
/// world.resume();
/// world.tick(0.1, &mut NoopObserver);
/// ```
pub struct WorldBuilder<P: PathPlanner = AStarPlanner, T: TaskPolicy = FactoryDispatch> {
    config:    WorldConfig,
    planner:   P,
    policy:    T,
    overrides: Overrides,
}

impl WorldBuilder {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            planner:   AStarPlanner::default(),
            policy:    FactoryDispatch,
            overrides: Overrides::default(),
        }
    }
}

impl<P: PathPlanner, T: TaskPolicy> WorldBuilder<P, T> {
    /// Replace the grid search.
    pub fn planner<P2: PathPlanner>(self, planner: P2) -> WorldBuilder<P2, T> {
        WorldBuilder {
            config:    self.config,
            planner,
            policy:    self.policy,
            overrides: self.overrides,
        }
    }

    /// Replace the task dispatcher.
    pub fn policy<T2: TaskPolicy>(self, policy: T2) -> WorldBuilder<P, T2> {
        WorldBuilder {
            config:    self.config,
            planner:   self.planner,
            policy,
            overrides: self.overrides,
        }
    }

    /// Put the masts at these ground positions instead of the default
    /// pattern.  `station_count` is ignored.
    pub fn station_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.overrides.station_positions = Some(positions);
        self
    }

    /// Spawn AGV `i` at `points[i]`.  AGVs past the end of the list spawn at
    /// random.
    pub fn spawn_points(mut self, points: Vec<Vec3>) -> Self {
        self.overrides.spawn_points = Some(points);
        self
    }

    /// Validate the config and build the first generation.
    pub fn build(self) -> SimResult<World<P, T>> {
        self.config.validate()?;
        if let Some(p) = &self.overrides.station_positions {
            if p.iter().any(|v| !v.is_finite()) {
                return Err(SimError::Config("station positions must be finite".into()));
            }
        }
        let controller = AgvController::new(self.planner, self.policy, self.config.motion.clone());
        World::assemble(self.config, controller, self.overrides)
    }
}
