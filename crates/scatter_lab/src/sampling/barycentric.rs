//! Barycentric point sampling on triangles.
use glam::Vec3;
use rand::RngCore;

use crate::sampling::rand01;

/// Barycentric weights `(u, v, w)` for the corners `(a, b, c)` of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl Barycentric {
    /// Draws `u` uniformly, then `v` scaled by `1 - u`, and sets `w = 1 - u - v`.
    ///
    /// The result always lies inside the triangle. It is not area-uniform: points
    /// concentrate towards the `a` corner as `u` grows.
    pub fn sample(rng: &mut dyn RngCore) -> Self {
        let u = rand01(rng);
        let v = rand01(rng) * (1.0 - u);
        let w = (1.0 - u - v).max(0.0);
        Self { u, v, w }
    }

    #[inline]
    pub fn apply(&self, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
        a * self.u + b * self.v + c * self.w
    }

    pub fn is_valid(&self) -> bool {
        self.u >= 0.0
            && self.v >= 0.0
            && self.w >= 0.0
            && (self.u + self.v + self.w - 1.0).abs() < 1e-5
    }
}
