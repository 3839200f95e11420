//! Factory environment generation.
//!
//! # Layout
//!
//! For a floor of side `s` centred on the origin:
//!
//! | Body              | Footprint (x × z)      | Centre (x, z)               | Collidable |
//! |-------------------|------------------------|-----------------------------|------------|
//! | perimeter walls   | `s × 1`, `1 × s`       | `(0, ±s/2)`, `(±s/2, 0)`    | yes        |
//! | interior wall A   | `1 × ¾s`               | `(−s/6, s/8)`               | yes        |
//! | interior wall B   | `s/2 × 1`              | `(s/4, 0)`                  | yes        |
//! | workstations × 6  | `12 × 12`, 0.5 high    | `(0.4s, −0.35s + 0.14s·i)`  | no         |
//! | charging pad      | `20 × 20`, flat        | `(−0.4s, 0.4s)`             | no         |
//! | random boxes      | `20(r+0.1)` per axis   | uniform, `±(s/2 − 5)`       | yes        |
//!
//! Workstations, the pad, and boxes are placed in that order and a body is
//! skipped if its footprint overlaps one already placed.  Each box gets up
//! to 20 attempts.  Walls are exempt from the overlap check.

use ft_core::{Aabb, SimRng, Vec3};
use ft_mobility::Sites;

use crate::{LayoutKind, WorldConfig};

const WORKSTATION_COUNT: usize = 6;
const WORKSTATION_SIZE: f64 = 12.0;
const WORKSTATION_HEIGHT: f64 = 0.5;
const CHARGER_SIZE: f64 = 20.0;
const OBSTACLE_ATTEMPTS: usize = 20;
const OBSTACLE_SCALE: f64 = 20.0;
/// Box centres stay this far inside the floor edge.
const OBSTACLE_MARGIN: f64 = 5.0;
const WALL_THICKNESS: f64 = 1.0;

/// Static geometry of one world generation.
#[derive(Debug, Clone, Default)]
pub struct FactoryLayout {
    pub walls:        Vec<Aabb>,
    pub obstacles:    Vec<Aabb>,
    pub workstations: Vec<Aabb>,
    pub charger:      Option<Aabb>,
}

impl FactoryLayout {
    /// A bare floor.
    pub fn open() -> Self {
        Self::default()
    }

    /// Build the layout selected by `config.layout`.
    pub fn generate(config: &WorldConfig, rng: &mut SimRng) -> Self {
        match config.layout {
            LayoutKind::Open => Self::open(),
            LayoutKind::Factory => Self::factory(config, rng),
        }
    }

    fn factory(config: &WorldConfig, rng: &mut SimRng) -> Self {
        let s = config.factory_size;
        let h = config.wall_height;
        let t = WALL_THICKNESS;

        let walls = vec![
            Aabb::on_floor(0.0, -s / 2.0, s, h, t),
            Aabb::on_floor(0.0, s / 2.0, s, h, t),
            Aabb::on_floor(s / 2.0, 0.0, t, h, s),
            Aabb::on_floor(-s / 2.0, 0.0, t, h, s),
            Aabb::on_floor(-s / 6.0, s / 8.0, t, h, s * 0.75),
            Aabb::on_floor(s / 4.0, 0.0, s / 2.0, h, t),
        ];

        let mut placed: Vec<Aabb> = Vec::new();
        let mut try_place = |body: Aabb| {
            let clear = !placed.iter().any(|p| footprints_overlap(p, &body));
            if clear {
                placed.push(body);
            }
            clear
        };

        let mut workstations = Vec::with_capacity(WORKSTATION_COUNT);
        for i in 0..WORKSTATION_COUNT {
            let ws = Aabb::on_floor(
                s * 0.4,
                -s * 0.35 + i as f64 * s * 0.14,
                WORKSTATION_SIZE,
                WORKSTATION_HEIGHT,
                WORKSTATION_SIZE,
            );
            if try_place(ws) {
                workstations.push(ws);
            }
        }

        let pad = Aabb::on_floor(-s * 0.4, s * 0.4, CHARGER_SIZE, 0.0, CHARGER_SIZE);
        let charger = try_place(pad).then_some(pad);

        let reach = (s / 2.0 - OBSTACLE_MARGIN).max(0.0);
        let mut obstacles = Vec::with_capacity(config.obstacle_count);
        for _ in 0..config.obstacle_count {
            for _ in 0..OBSTACLE_ATTEMPTS {
                let (sx, sy, sz) = (rng.unit() + 0.1, rng.unit() + 0.1, rng.unit() + 0.1);
                let x = ((rng.unit() - 0.5) * s).clamp(-reach, reach);
                let z = ((rng.unit() - 0.5) * s).clamp(-reach, reach);
                let height = (sy * h - 1.0).max(1.0);
                let body = Aabb::on_floor(x, z, sx * OBSTACLE_SCALE, height, sz * OBSTACLE_SCALE);
                if try_place(body) {
                    obstacles.push(body);
                    break;
                }
            }
        }

        if obstacles.len() < config.obstacle_count {
            tracing::debug!(
                placed = obstacles.len(),
                requested = config.obstacle_count,
                "some obstacles found no free spot"
            );
        }

        Self { walls, obstacles, workstations, charger }
    }

    /// Everything AGVs collide with and radio signals are shadowed by.
    pub fn collidable(&self) -> Vec<Aabb> {
        self.walls.iter().chain(&self.obstacles).copied().collect()
    }

    /// Floor-level destinations for the dispatcher.
    pub fn sites(&self) -> Sites {
        let floor_point = |b: &Aabb| {
            let c = b.center();
            Vec3::new(c.x, 0.0, c.z)
        };
        Sites {
            workstations: self.workstations.iter().map(floor_point).collect(),
            charger:      self.charger.as_ref().map(floor_point),
        }
    }
}

fn footprints_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.z <= b.max.z && a.max.z >= b.min.z
}
