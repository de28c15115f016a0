//! Area-weighted candidate sampling on polygon meshes.
use glam::Vec3;
use rand::RngCore;

use crate::geometry::SurfaceMesh;
use crate::sampling::{Barycentric, Candidate, CandidateFrame, CandidateSampling, CumulativeTable};

/// Picks a polygon with probability proportional to its area, then a point on it.
///
/// Triangles are sampled with [`Barycentric::sample`]. Polygons with more than three
/// vertices always yield their center, which biases n-gon meshes towards face centers.
#[derive(Debug, Clone)]
pub struct SurfaceSampler<'a> {
    mesh: &'a SurfaceMesh,
    areas: CumulativeTable,
}

impl<'a> SurfaceSampler<'a> {
    pub fn new(mesh: &'a SurfaceMesh) -> Self {
        Self {
            mesh,
            areas: CumulativeTable::new(mesh.polygons.iter().map(|p| p.area)),
        }
    }

    pub fn mesh(&self) -> &SurfaceMesh {
        self.mesh
    }

    /// Index of the polygon that an area value in `[0, total_area]` falls into.
    pub fn polygon_at(&self, area_value: f32) -> Option<usize> {
        self.areas.locate(area_value)
    }
}

impl CandidateSampling for SurfaceSampler<'_> {
    fn measure(&self) -> f32 {
        self.areas.total()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Candidate {
        let Some((index, _)) = self.areas.pick(rng) else {
            return Candidate {
                position: self.mesh.to_world_point(Vec3::ZERO),
                frame: CandidateFrame::Free,
            };
        };
        let polygon = &self.mesh.polygons[index];

        let local = if polygon.is_triangle() {
            let mut corners = self.mesh.polygon_positions(polygon);
            match (corners.next(), corners.next(), corners.next()) {
                (Some(a), Some(b), Some(c)) => Barycentric::sample(rng).apply(a, b, c),
                _ => polygon.center,
            }
        } else {
            polygon.center
        };

        Candidate {
            position: self.mesh.to_world_point(local),
            frame: CandidateFrame::SurfaceNormal(self.mesh.to_world_normal(polygon.normal)),
        }
    }
}
