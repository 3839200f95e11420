//! Collidable geometry and the ray query used for lookahead and line of sight.
//!
//! # Spatial index
//!
//! Every body's `x`/`z` footprint is bulk-loaded into an R-tree (via
//! `rstar`).  A ray query first collects the bodies whose footprint overlaps
//! the footprint of the ray segment, then runs the exact slab test on those
//! only.  With a few dozen walls and boxes this mostly saves work for the
//! radio model, which casts `agvs × stations` rays every tick.

use rstar::{RTree, RTreeObject, AABB};

use ft_core::{Aabb, Ray};

// ── CollisionQuery ────────────────────────────────────────────────────────────

/// Ray-intersection test against a set of collidable bodies.
///
/// Navigation uses it for collision lookahead, the radio model for
/// line-of-sight checks.
pub trait CollisionQuery {
    /// Distance along `ray` to the nearest body surface, if one is hit
    /// strictly before `max_dist`.  Pass `f64::INFINITY` for an unbounded
    /// query.
    fn nearest_hit(&self, ray: &Ray, max_dist: f64) -> Option<f64>;
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct BodyEntry {
    footprint: AABB<[f64; 2]>, // [x, z]
    index:     usize,
}

impl RTreeObject for BodyEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.footprint
    }
}

fn footprint(b: &Aabb) -> AABB<[f64; 2]> {
    AABB::from_corners([b.min.x, b.min.z], [b.max.x, b.max.z])
}

// ── ObstacleSet ───────────────────────────────────────────────────────────────

/// The static collidable bodies of the factory (walls and obstacle boxes).
pub struct ObstacleSet {
    bodies: Vec<Aabb>,
    index:  RTree<BodyEntry>,
}

impl ObstacleSet {
    pub fn new(bodies: Vec<Aabb>) -> Self {
        let entries = bodies
            .iter()
            .enumerate()
            .map(|(index, b)| BodyEntry { footprint: footprint(b), index })
            .collect();
        Self { index: RTree::bulk_load(entries), bodies }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn bodies(&self) -> &[Aabb] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Add a body.  The R-tree is updated in place.
    pub fn insert(&mut self, body: Aabb) {
        let index = self.bodies.len();
        self.index.insert(BodyEntry { footprint: footprint(&body), index });
        self.bodies.push(body);
    }

    /// `true` if any body overlaps `query`.
    pub fn overlaps(&self, query: &Aabb) -> bool {
        self.index
            .locate_in_envelope_intersecting(&footprint(query))
            .any(|e| self.bodies[e.index].intersects(query))
    }
}

impl CollisionQuery for ObstacleSet {
    fn nearest_hit(&self, ray: &Ray, max_dist: f64) -> Option<f64> {
        let closer = |t: f64| t < max_dist;

        if !max_dist.is_finite() {
            return self
                .bodies
                .iter()
                .filter_map(|b| b.ray_distance(ray))
                .filter(|&t| closer(t))
                .min_by(f64::total_cmp);
        }

        let end = ray.at(max_dist);
        let segment = AABB::from_corners(
            [ray.origin.x.min(end.x), ray.origin.z.min(end.z)],
            [ray.origin.x.max(end.x), ray.origin.z.max(end.z)],
        );
        self.index
            .locate_in_envelope_intersecting(&segment)
            .filter_map(|e| self.bodies[e.index].ray_distance(ray))
            .filter(|&t| closer(t))
            .min_by(f64::total_cmp)
    }
}
