//! World-space geometry: points, boxes, rays, and the floor rectangle.
//!
//! The factory floor is the `x`/`z` plane with `y` pointing up, matching the
//! scene coordinates the visualisation uses.  All values are `f64`: the radio
//! model takes logarithms of distances and the planner accumulates path
//! costs, and single precision is visibly noisy for both.

use std::ops::{Add, AddAssign, Mul, Sub};

/// Tolerance below which a direction component is treated as zero.
const PARALLEL_EPS: f64 = 1e-12;

// ── Vec3 ──────────────────────────────────────────────────────────────────────

/// A point or direction in world space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for a (near-)zero vector.
    pub fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        if len <= PARALLEL_EPS || !len.is_finite() {
            return None;
        }
        Some(self * (1.0 / len))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Copy with `y` zeroed.  Movement and lookahead happen in the floor plane.
    #[inline]
    pub fn flatten(self) -> Vec3 {
        Vec3 { y: 0.0, ..self }
    }

    /// Heading in radians about the `y` axis (`atan2(x, z)`), the yaw a
    /// renderer applies to make a model face along `self`.
    #[inline]
    pub fn yaw(self) -> f64 {
        self.x.atan2(self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── Ray ───────────────────────────────────────────────────────────────────────

/// A half-line with a unit-length direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir:    Vec3,
}

impl Ray {
    /// Build a ray from `origin` along `dir`.  Returns `None` if `dir` has
    /// zero length.
    pub fn new(origin: Vec3, dir: Vec3) -> Option<Self> {
        dir.normalized().map(|dir| Self { origin, dir })
    }

    /// Ray from `from` pointing at `to`, together with the distance between
    /// them.  `None` when the two points coincide.
    pub fn between(from: Vec3, to: Vec3) -> Option<(Self, f64)> {
        let delta = to - from;
        let dist = delta.length();
        Ray::new(from, delta).map(|ray| (ray, dist))
    }

    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

// ── Aabb ──────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box from two corners in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box of the given full `size` centred on `center`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Box resting on the floor (`y = 0`) with footprint `sx × sz` and
    /// height `sy`, centred on `(x, z)`.
    pub fn on_floor(x: f64, z: f64, sx: f64, sy: f64, sz: f64) -> Self {
        Self::new(
            Vec3::new(x - sx * 0.5, 0.0, z - sz * 0.5),
            Vec3::new(x + sx * 0.5, sy, z + sz * 0.5),
        )
    }

    /// Grow every face outward by `margin`.
    pub fn expanded(self, margin: f64) -> Self {
        let m = Vec3::new(margin, margin, margin);
        Self { min: self.min - m, max: self.max + m }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Closed-interval overlap test (touching boxes intersect).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// `true` if `p` lies inside the box (boundary inclusive).
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Distance along `ray` to the first face the ray enters, using the
    /// slab method.
    ///
    /// Only surfaces facing the ray count: a ray that starts inside the box
    /// reports no hit, the same as front-face-only scene raycasting.  This
    /// lets a vehicle that has been pushed into a box drive back out.
    pub fn ray_distance(&self, ray: &Ray) -> Option<f64> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for (o, d, lo, hi) in [
            (ray.origin.x, ray.dir.x, self.min.x, self.max.x),
            (ray.origin.y, ray.dir.y, self.min.y, self.max.y),
            (ray.origin.z, ray.dir.z, self.min.z, self.max.z),
        ] {
            if d.abs() < PARALLEL_EPS {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        (t_min >= 0.0).then_some(t_min)
    }
}

// ── FloorBounds ───────────────────────────────────────────────────────────────

/// The rectangular factory floor in the `x`/`z` plane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorBounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl FloorBounds {
    /// A square floor of side `size` centred on the origin.
    pub fn centered(size: f64) -> Self {
        let half = size * 0.5;
        Self { min_x: -half, min_z: -half, max_x: half, max_z: half }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Clamp `p` into the floor shrunk by `inset` on every side.  `y` is left
    /// untouched.
    pub fn clamp(&self, p: Vec3, inset: f64) -> Vec3 {
        Vec3 {
            x: p.x.clamp(self.min_x + inset, (self.max_x - inset).max(self.min_x + inset)),
            y: p.y,
            z: p.z.clamp(self.min_z + inset, (self.max_z - inset).max(self.min_z + inset)),
        }
    }

    /// `true` if `p` lies within the floor shrunk by `inset`.
    pub fn contains(&self, p: Vec3, inset: f64) -> bool {
        p.x >= self.min_x + inset && p.x <= self.max_x - inset
            && p.z >= self.min_z + inset && p.z <= self.max_z - inset
    }
}
