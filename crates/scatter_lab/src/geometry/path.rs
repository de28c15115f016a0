//! Polyline curves used as path scatter targets.
use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};

/// One or more polylines (e.g. the splines of a curve object) with a local-to-world transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathCurve {
    /// Control points of each polyline in local space.
    pub polylines: Vec<Vec<Vec3>>,
    pub world: Affine3A,
}

/// A straight world-space piece of a [`PathCurve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
}

impl PathSegment {
    /// Point at fraction `t` in [0, 1] along the segment.
    #[inline]
    pub fn lerp(&self, t: f32) -> Vec3 {
        self.start.lerp(self.end, t)
    }

    /// Unit direction from start to end.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }
}

impl PathCurve {
    /// Creates a curve from a single polyline.
    pub fn new<V: Into<Vec3>>(points: Vec<V>) -> Self {
        Self {
            polylines: vec![points.into_iter().map(Into::into).collect()],
            world: Affine3A::IDENTITY,
        }
    }

    /// Appends another polyline.
    pub fn with_polyline<V: Into<Vec3>>(mut self, points: Vec<V>) -> Self {
        self.polylines
            .push(points.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the local-to-world transform.
    pub fn with_world_transform(mut self, world: Affine3A) -> Self {
        self.world = world;
        self
    }

    /// Whether at least one polyline has two or more control points.
    pub fn has_segments(&self) -> bool {
        self.polylines.iter().any(|p| p.len() >= 2)
    }

    /// World-space segments of all polylines in order. Zero-length segments are dropped.
    pub fn world_segments(&self) -> Vec<PathSegment> {
        let mut out = Vec::new();
        for polyline in &self.polylines {
            for pair in polyline.windows(2) {
                let start = self.world.transform_point3(pair[0]);
                let end = self.world.transform_point3(pair[1]);
                let length = start.distance(end);
                if length > 0.0 {
                    out.push(PathSegment { start, end, length });
                }
            }
        }
        out
    }

    /// Total world-space length over all polylines.
    pub fn total_length(&self) -> f32 {
        self.world_segments().iter().map(|s| s.length).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_span_every_polyline() {
        let curve = PathCurve::new(vec![Vec3::ZERO, Vec3::X * 2.0, Vec3::new(2.0, 3.0, 0.0)])
            .with_polyline(vec![Vec3::Z, Vec3::Z * 2.0]);
        let segments = curve.world_segments();
        assert_eq!(segments.len(), 3);
        assert!((curve.total_length() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn zero_length_segments_are_dropped() {
        let curve = PathCurve::new(vec![Vec3::ZERO, Vec3::ZERO, Vec3::X]);
        assert_eq!(curve.world_segments().len(), 1);
    }

    #[test]
    fn single_point_polyline_has_no_segments() {
        let curve = PathCurve::new(vec![Vec3::ONE]);
        assert!(!curve.has_segments());
        assert!(curve.world_segments().is_empty());
    }

    #[test]
    fn world_transform_scales_length() {
        let curve = PathCurve::new(vec![Vec3::ZERO, Vec3::X])
            .with_world_transform(Affine3A::from_scale(Vec3::splat(3.0)));
        assert!((curve.total_length() - 3.0).abs() < 1e-6);
        let seg = curve.world_segments()[0];
        assert_eq!(seg.direction(), Vec3::X);
        assert_eq!(seg.lerp(0.5), Vec3::new(1.5, 0.0, 0.0));
    }
}
