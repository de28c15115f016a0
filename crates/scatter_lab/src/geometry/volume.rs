//! Axis-aligned box used as a volume scatter target.
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBox {
    /// Edge lengths along X, Y and Z.
    pub size: Vec3,
    /// World-space center.
    pub center: Vec3,
}

impl Default for VolumeBox {
    fn default() -> Self {
        Self {
            size: Vec3::splat(10.0),
            center: Vec3::ZERO,
        }
    }
}

impl VolumeBox {
    pub fn new(size: impl Into<Vec3>, center: impl Into<Vec3>) -> Self {
        Self {
            size: size.into(),
            center: center.into(),
        }
    }

    pub fn volume(&self) -> f32 {
        self.size.x * self.size.y * self.size.z
    }

    /// Minimum and maximum corners.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = self.size * 0.5;
        (self.center - half, self.center + half)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0 && self.size.z > 0.0)
    }
}
