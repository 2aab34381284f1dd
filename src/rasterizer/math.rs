//! Vector math for the rasterizer
//!
//! Everything here is a pure function over `f32` values.

use std::ops::{Add, AddAssign, Mul, Sub};
use serde::{Serialize, Deserialize};

use super::types::Viewport;

/// Below this magnitude a barycentric denominator counts as zero area.
pub const DEGENERATE_EPSILON: f32 = 0.0001;

/// Rounding slack on the denominator, in units of `f32::EPSILON`
const DENOMINATOR_ULPS: f32 = 8.0;

/// 3D vector, also used for RGB colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn try_normalize(self) -> Option<Vec3> {
        let l = self.len();
        if l == 0.0 || !l.is_finite() {
            return None;
        }
        Some(Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        })
    }

    pub fn normalize(self) -> Vec3 {
        self.try_normalize().unwrap_or(Vec3::ZERO)
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component-wise product (used to modulate colors)
    pub fn mul_elem(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// Map a world-space point to screen space (orthographic).
/// Z passes through untouched for the depth test.
pub fn project(v: Vec3, viewport: &Viewport) -> Vec3 {
    let world = &viewport.world;
    Vec3 {
        x: ((v.x - world.x_min) * viewport.width as f32) / (world.x_max - world.x_min),
        y: ((v.y - world.y_min) * viewport.height as f32) / (world.y_max - world.y_min),
        z: v.z,
    }
}

/// Twice the signed area of the 2D triangle (v1, v2, v3), ignoring Z.
/// This is the shared denominator of all three barycentric weights.
pub fn barycentric_denominator(v1: Vec3, v2: Vec3, v3: Vec3) -> f32 {
    (v1.x * v2.y) - (v1.x * v3.y) - (v2.x * v1.y) + (v2.x * v3.y) + (v3.x * v1.y) - (v3.x * v2.y)
}

/// Largest denominator that f32 rounding alone can produce for a triangle
/// that was collinear before projection.
///
/// Two error sources: the six products themselves, and vertex positions
/// that are off by a few ulps of `canvas_extent` (the larger canvas side)
/// after projection, which moves the area by that much per unit of edge.
pub fn degenerate_tolerance(v1: Vec3, v2: Vec3, v3: Vec3, canvas_extent: f32) -> f32 {
    let products = (v1.x * v2.y).abs()
        + (v1.x * v3.y).abs()
        + (v2.x * v1.y).abs()
        + (v2.x * v3.y).abs()
        + (v3.x * v1.y).abs()
        + (v3.x * v2.y).abs();
    let span = (v1.x.max(v2.x).max(v3.x) - v1.x.min(v2.x).min(v3.x))
        + (v1.y.max(v2.y).max(v3.y) - v1.y.min(v2.y).min(v3.y));
    let slack = products + canvas_extent.abs() * span;
    (DENOMINATOR_ULPS * f32::EPSILON * slack).max(DEGENERATE_EPSILON)
}

/// True when the triangle has (numerically) no area in the XY plane.
pub fn is_degenerate(denom: f32, tolerance: f32) -> bool {
    !denom.is_finite() || denom.abs() <= tolerance
}

/// Barycentric weights of p for a triangle whose denominator is already known.
/// Returns (alpha, beta, gamma) packed into x, y, z.
pub fn barycentric_with(p: Vec3, v1: Vec3, v2: Vec3, v3: Vec3, denom: f32) -> Vec3 {
    let alpha = ((p.x * v2.y) - (p.x * v3.y) - (v2.x * p.y) + (v2.x * v3.y) + (v3.x * p.y) - (v3.x * v2.y)) / denom;
    let beta = ((v1.x * p.y) - (v1.x * v3.y) - (p.x * v1.y) + (p.x * v3.y) + (v3.x * v1.y) - (v3.x * p.y)) / denom;
    let gamma = ((v1.x * v2.y) - (v1.x * p.y) - (v2.x * v1.y) + (v2.x * p.y) + (p.x * v1.y) - (p.x * v2.y)) / denom;

    Vec3::new(alpha, beta, gamma)
}

/// Calculate barycentric coordinates for point p in triangle (v1, v2, v3).
/// Returns `None` if the triangle is degenerate in screen space. Only the
/// rounding of the denominator itself is tolerated here.
pub fn barycentric(p: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) -> Option<Vec3> {
    let d = barycentric_denominator(v1, v2, v3);
    if is_degenerate(d, degenerate_tolerance(v1, v2, v3, 0.0)) {
        return None;
    }
    Some(barycentric_with(p, v1, v2, v3, d))
}

/// Strict interior test: edges and vertices are outside.
pub fn strictly_inside(bc: Vec3) -> bool {
    bc.x > 0.0 && bc.x < 1.0
        && bc.y > 0.0 && bc.y < 1.0
        && bc.z > 0.0 && bc.z < 1.0
}
