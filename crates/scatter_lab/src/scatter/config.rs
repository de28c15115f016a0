//! Scatter configuration: method, target geometry, overlap settings and items.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{PathCurve, SurfaceMesh, VolumeBox};
use crate::scatter::{DensityScale, ScatterItem};

/// How candidates are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScatterMethod {
    Surface,
    Volume,
    Path,
}

impl ScatterMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScatterMethod::Surface => "surface",
            ScatterMethod::Volume => "volume",
            ScatterMethod::Path => "path",
        }
    }
}

/// Geometry the host resolved for the configured target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScatterTarget {
    Mesh(SurfaceMesh),
    Volume(VolumeBox),
    Path(PathCurve),
}

impl ScatterTarget {
    /// Method this target can serve.
    pub fn method(&self) -> ScatterMethod {
        match self {
            ScatterTarget::Mesh(_) => ScatterMethod::Surface,
            ScatterTarget::Volume(_) => ScatterMethod::Volume,
            ScatterTarget::Path(_) => ScatterMethod::Path,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ScatterTarget::Mesh(_) => "mesh",
            ScatterTarget::Volume(_) => "volume box",
            ScatterTarget::Path(_) => "curve",
        }
    }
}

/// Configuration for one scatter invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ScatterConfig {
    pub method: ScatterMethod,
    /// Resolved target. `None` when the host found no target object.
    pub target: Option<ScatterTarget>,
    /// Reject candidates closer than `min_distance` to an accepted placement of the same item.
    pub avoid_overlap: bool,
    /// Minimum separation in world units when `avoid_overlap` is set.
    pub min_distance: f32,
    /// Maximum lateral offset from the path for items that are not aligned to it.
    pub path_offset: f32,
    /// Candidate count factors per method.
    pub density_scale: DensityScale,
    pub items: Vec<ScatterItem>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            method: ScatterMethod::Surface,
            target: None,
            avoid_overlap: true,
            min_distance: 1.0,
            path_offset: 0.5,
            density_scale: DensityScale::default(),
            items: Vec::new(),
        }
    }
}

impl ScatterConfig {
    /// Creates a config for `method` without a target.
    pub fn new(method: ScatterMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Surface scatter on `mesh`.
    pub fn surface(mesh: SurfaceMesh) -> Self {
        Self::new(ScatterMethod::Surface).with_target(ScatterTarget::Mesh(mesh))
    }

    /// Volume scatter inside `volume`.
    pub fn volume(volume: VolumeBox) -> Self {
        Self::new(ScatterMethod::Volume).with_target(ScatterTarget::Volume(volume))
    }

    /// Path scatter along `curve`.
    pub fn path(curve: PathCurve) -> Self {
        Self::new(ScatterMethod::Path).with_target(ScatterTarget::Path(curve))
    }

    pub fn with_target(mut self, target: ScatterTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Enables overlap avoidance with the given minimum distance.
    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.avoid_overlap = true;
        self.min_distance = min_distance;
        self
    }

    pub fn with_avoid_overlap(mut self, avoid_overlap: bool) -> Self {
        self.avoid_overlap = avoid_overlap;
        self
    }

    pub fn with_path_offset(mut self, path_offset: f32) -> Self {
        self.path_offset = path_offset;
        self
    }

    pub fn with_density_scale(mut self, density_scale: DensityScale) -> Self {
        self.density_scale = density_scale;
        self
    }

    pub fn with_item(mut self, item: ScatterItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = ScatterItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Removes the last item, mirroring the item list's remove button.
    pub fn pop_item(&mut self) -> Option<ScatterItem> {
        self.items.pop()
    }

    /// Density factor for the configured method.
    pub fn density_factor(&self) -> f32 {
        match self.method {
            ScatterMethod::Surface => self.density_scale.surface,
            ScatterMethod::Volume => self.density_scale.volume,
            ScatterMethod::Path => self.density_scale.path,
        }
    }

    /// Validates parameters, item list and items. Target geometry is checked separately
    /// by [`ScatterConfig::resolve_target`].
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::NoItems);
        }
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(Error::InvalidConfig("min_distance must be >= 0".into()));
        }
        if !self.path_offset.is_finite() || self.path_offset < 0.0 {
            return Err(Error::InvalidConfig("path_offset must be >= 0".into()));
        }
        self.density_scale.validate()?;
        for (index, item) in self.items.iter().enumerate() {
            item.validate().map_err(|e| match e {
                Error::InvalidConfig(msg) => Error::InvalidConfig(format!("item {index}: {msg}")),
                other => other,
            })?;
        }
        Ok(())
    }

    /// Returns the target if it is present, matches the method and is usable.
    pub fn resolve_target(&self) -> Result<&ScatterTarget> {
        let target = self.target.as_ref().ok_or_else(|| {
            Error::InvalidTarget(format!("no {} target selected", self.method.as_str()))
        })?;

        if target.method() != self.method {
            let expected = match self.method {
                ScatterMethod::Surface => "a mesh",
                ScatterMethod::Volume => "a volume box",
                ScatterMethod::Path => "a curve",
            };
            return Err(Error::InvalidTarget(format!(
                "{} scatter needs {expected}, got a {}",
                self.method.as_str(),
                target.kind_name()
            )));
        }

        match target {
            ScatterTarget::Mesh(mesh) if mesh.polygons.is_empty() => {
                Err(Error::InvalidTarget("target mesh has no polygons".into()))
            }
            ScatterTarget::Mesh(mesh) => mesh.check_indices().map(|()| target),
            ScatterTarget::Volume(volume) if volume.is_degenerate() => Err(Error::InvalidTarget(
                "volume size must be > 0 on every axis".into(),
            )),
            ScatterTarget::Path(curve) if !curve.has_segments() => Err(Error::InvalidTarget(
                "path needs a polyline with at least two points".into(),
            )),
            _ => Ok(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::Polygon;

    #[test]
    fn empty_items_fail_before_target_checks() {
        let config = ScatterConfig::new(ScatterMethod::Surface);
        assert!(matches!(config.validate(), Err(Error::NoItems)));
    }

    #[test]
    fn missing_target_is_invalid() {
        let config = ScatterConfig::new(ScatterMethod::Path).with_item(ScatterItem::new("a"));
        assert!(matches!(
            config.resolve_target(),
            Err(Error::InvalidTarget(ref msg)) if msg.contains("path")
        ));
    }

    #[test]
    fn wrong_kind_target_is_invalid() {
        let config = ScatterConfig::new(ScatterMethod::Surface)
            .with_target(ScatterTarget::Path(PathCurve::new(vec![Vec3::ZERO, Vec3::X])))
            .with_item(ScatterItem::new("a"));
        let err = config.resolve_target().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid scatter target: surface scatter needs a mesh, got a curve"
        );
    }

    #[test]
    fn degenerate_targets_are_invalid() {
        let empty_mesh = SurfaceMesh::new(Vec::<Vec3>::new(), Vec::new()).unwrap();
        let flat = VolumeBox::new(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO);
        let dot = PathCurve::new(vec![Vec3::ZERO]);
        for config in [
            ScatterConfig::surface(empty_mesh),
            ScatterConfig::volume(flat),
            ScatterConfig::path(dot),
        ] {
            assert!(matches!(
                config.resolve_target(),
                Err(Error::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn dangling_polygon_indices_are_invalid() {
        let mut edited = SurfaceMesh::plane(1.0);
        edited.polygons = vec![Polygon::with_attributes(
            vec![0, 1, 9],
            0.5,
            Vec3::Z,
            Vec3::ZERO,
        )];

        let mut json = serde_json::to_value(SurfaceMesh::plane(1.0)).unwrap();
        json["polygons"][0]["vertices"] = serde_json::json!([0, 1, 7]);
        let loaded: SurfaceMesh = serde_json::from_value(json).unwrap();

        for mesh in [edited, loaded] {
            let config = ScatterConfig::surface(mesh).with_item(ScatterItem::new("a"));
            assert!(matches!(
                config.resolve_target(),
                Err(Error::InvalidTarget(ref msg)) if msg.contains("references vertex")
            ));
        }
    }

    #[test]
    fn item_errors_name_the_item() {
        let config = ScatterConfig::volume(VolumeBox::default())
            .with_item(ScatterItem::new("a"))
            .with_item(ScatterItem::new("b").with_seed(0));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("item 1"), "{err}");
    }

    #[test]
    fn negative_distances_are_rejected() {
        let base = ScatterConfig::volume(VolumeBox::default()).with_item(ScatterItem::new("a"));
        assert!(base.clone().with_min_distance(-1.0).validate().is_err());
        assert!(base.clone().with_path_offset(-0.1).validate().is_err());
        assert!(base.validate().is_ok());
    }

    #[test]
    fn density_factor_follows_method() {
        let k = DensityScale {
            surface: 1.0,
            volume: 2.0,
            path: 3.0,
        };
        let factor = |method| ScatterConfig::new(method).with_density_scale(k).density_factor();
        assert_eq!(factor(ScatterMethod::Surface), 1.0);
        assert_eq!(factor(ScatterMethod::Volume), 2.0);
        assert_eq!(factor(ScatterMethod::Path), 3.0);
    }

    #[test]
    fn pop_item_removes_last() {
        let mut config = ScatterConfig::new(ScatterMethod::Volume)
            .with_items([ScatterItem::new("a"), ScatterItem::new("b")]);
        let removed = config.pop_item().unwrap();
        assert_eq!(removed.object.unwrap().as_str(), "b");
        assert_eq!(config.items.len(), 1);
    }
}
