//! Scatter pipeline: items, configuration, orientation, overlap rejection, runner and events.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod config;
pub mod events;
pub mod orientation;
pub mod overlap;
pub mod runner;

/// Instances per unit area for a density of 1 in surface mode.
pub const SURFACE_DENSITY_SCALE: f32 = 10.0;
/// Instances per unit volume for a density of 1 in volume mode.
pub const VOLUME_DENSITY_SCALE: f32 = 5.0;
/// Instances per unit length for a density of 1 in path mode.
pub const PATH_DENSITY_SCALE: f32 = 2.0;

/// Opaque handle to a placeable asset, resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef(pub String);

impl ObjectRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ObjectRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Factors converting item density into candidate counts per target measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityScale {
    pub surface: f32,
    pub volume: f32,
    pub path: f32,
}

impl Default for DensityScale {
    fn default() -> Self {
        Self {
            surface: SURFACE_DENSITY_SCALE,
            volume: VOLUME_DENSITY_SCALE,
            path: PATH_DENSITY_SCALE,
        }
    }
}

impl DensityScale {
    pub fn validate(&self) -> Result<()> {
        for (name, k) in [
            ("surface", self.surface),
            ("volume", self.volume),
            ("path", self.path),
        ] {
            if !k.is_finite() || k < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} density scale must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// One kind of object to scatter, with its own density, ranges and random stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ScatterItem {
    /// Asset to instantiate. Items without an object are skipped.
    pub object: Option<ObjectRef>,
    /// Expected instances per unit of target measure, before the density scale.
    pub density: f32,
    /// Uniform scale factor range `[min, max]`.
    pub scale_range: [f32; 2],
    /// Rotation range `[min, max]` in degrees, used for the spin about the aligned axis.
    pub rotation_range: [f32; 2],
    /// Align the object's up axis (surface) or forward axis (path) to the target.
    pub align_to_normal: bool,
    /// Seed of this item's random stream, `>= 1`.
    pub seed: u64,
}

impl Default for ScatterItem {
    fn default() -> Self {
        Self {
            object: None,
            density: 1.0,
            scale_range: [0.8, 1.2],
            rotation_range: [0.0, 360.0],
            align_to_normal: true,
            seed: 1,
        }
    }
}

impl ScatterItem {
    /// Creates an item for `object` with default parameters.
    pub fn new(object: impl Into<ObjectRef>) -> Self {
        Self {
            object: Some(object.into()),
            ..Default::default()
        }
    }

    /// An item with no object assigned yet.
    pub fn unassigned() -> Self {
        Self::default()
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_scale_range(mut self, min: f32, max: f32) -> Self {
        self.scale_range = [min, max];
        self
    }

    pub fn with_rotation_range(mut self, min_deg: f32, max_deg: f32) -> Self {
        self.rotation_range = [min_deg, max_deg];
        self
    }

    pub fn with_align_to_normal(mut self, align: bool) -> Self {
        self.align_to_normal = align;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the item, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(Error::InvalidConfig("density must be > 0".into()));
        }
        let [smin, smax] = self.scale_range;
        if !(smin > 0.0 && smax.is_finite()) {
            return Err(Error::InvalidConfig("scale range must be positive".into()));
        }
        if smin > smax {
            return Err(Error::InvalidConfig(format!(
                "scale min {smin} exceeds max {smax}"
            )));
        }
        let [rmin, rmax] = self.rotation_range;
        if !(0.0..=360.0).contains(&rmin) || !(0.0..=360.0).contains(&rmax) {
            return Err(Error::InvalidConfig(
                "rotation range must lie within 0..=360 degrees".into(),
            ));
        }
        if rmin > rmax {
            return Err(Error::InvalidConfig(format!(
                "rotation min {rmin} exceeds max {rmax}"
            )));
        }
        if self.seed == 0 {
            return Err(Error::InvalidConfig("seed must be >= 1".into()));
        }
        Ok(())
    }
}
