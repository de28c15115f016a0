//! Polygon meshes used as surface scatter targets.
use glam::{Affine3A, Mat3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single face of a [`SurfaceMesh`] with its precomputed area, normal and center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertex indices into [`SurfaceMesh::vertices`], in winding order.
    pub vertices: Vec<u32>,
    /// Face area in local units.
    pub area: f32,
    /// Unit face normal in local space, or zero for degenerate faces.
    pub normal: Vec3,
    /// Mean of the face vertices in local space.
    pub center: Vec3,
}

impl Polygon {
    /// Builds a polygon from its vertex indices, computing area, normal and center with
    /// Newell's method.
    pub fn from_indices(indices: Vec<u32>, positions: &[Vec3]) -> Result<Self> {
        if indices.len() < 3 {
            return Err(Error::InvalidTarget(format!(
                "polygon needs at least 3 vertices, got {}",
                indices.len()
            )));
        }

        let mut points = Vec::with_capacity(indices.len());
        for &i in &indices {
            let p = positions.get(i as usize).copied().ok_or_else(|| {
                Error::InvalidTarget(format!(
                    "polygon references vertex {i} but mesh has {}",
                    positions.len()
                ))
            })?;
            points.push(p);
        }

        let mut newell = Vec3::ZERO;
        for (k, &a) in points.iter().enumerate() {
            let b = points[(k + 1) % points.len()];
            newell += a.cross(b);
        }
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;

        Ok(Self {
            vertices: indices,
            area: newell.length() * 0.5,
            normal: newell.normalize_or_zero(),
            center,
        })
    }

    /// Uses attributes the host already computed instead of deriving them.
    pub fn with_attributes(vertices: Vec<u32>, area: f32, normal: Vec3, center: Vec3) -> Self {
        Self {
            vertices,
            area,
            normal: normal.normalize_or_zero(),
            center,
        }
    }

    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }
}

/// A polygon mesh together with its local-to-world transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<Polygon>,
    pub world: Affine3A,
}

impl SurfaceMesh {
    /// Builds a mesh from vertex positions and faces given as index lists.
    pub fn new<V: Into<Vec3>>(vertices: Vec<V>, faces: Vec<Vec<u32>>) -> Result<Self> {
        let vertices: Vec<Vec3> = vertices.into_iter().map(Into::into).collect();
        let polygons = faces
            .into_iter()
            .map(|face| Polygon::from_indices(face, &vertices))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            vertices,
            polygons,
            world: Affine3A::IDENTITY,
        })
    }

    /// Builds a mesh from polygons whose attributes were precomputed by the host.
    pub fn from_polygons(vertices: Vec<Vec3>, polygons: Vec<Polygon>) -> Result<Self> {
        let mesh = Self {
            vertices,
            polygons,
            world: Affine3A::IDENTITY,
        };
        mesh.check_indices()?;
        Ok(mesh)
    }

    /// Fails with [`Error::InvalidTarget`] if any polygon references a missing vertex.
    pub fn check_indices(&self) -> Result<()> {
        for polygon in &self.polygons {
            if let Some(&bad) = polygon
                .vertices
                .iter()
                .find(|&&i| i as usize >= self.vertices.len())
            {
                return Err(Error::InvalidTarget(format!(
                    "polygon references vertex {bad} but mesh has {}",
                    self.vertices.len()
                )));
            }
        }
        Ok(())
    }

    /// A single quad of side `size` in the XY plane, centered on the origin, facing +Z.
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vec3::new(-h, -h, 0.0),
            Vec3::new(h, -h, 0.0),
            Vec3::new(h, h, 0.0),
            Vec3::new(-h, h, 0.0),
        ];
        let quad = Polygon::with_attributes(vec![0, 1, 2, 3], size * size, Vec3::Z, Vec3::ZERO);
        Self {
            vertices,
            polygons: vec![quad],
            world: Affine3A::IDENTITY,
        }
    }

    /// A triangulated XY grid of side `size` with `cells` quads per side, facing +Z.
    pub fn triangulated_grid(size: f32, cells: u32) -> Self {
        let cells = cells.max(1);
        let step = size / cells as f32;
        let origin = -size * 0.5;
        let row = cells + 1;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for y in 0..row {
            for x in 0..row {
                vertices.push(Vec3::new(
                    origin + x as f32 * step,
                    origin + y as f32 * step,
                    0.0,
                ));
            }
        }

        let tri_area = step * step * 0.5;
        let mut polygons = Vec::with_capacity((cells * cells * 2) as usize);
        for y in 0..cells {
            for x in 0..cells {
                let i0 = y * row + x;
                let i1 = i0 + 1;
                let i2 = i0 + row + 1;
                let i3 = i0 + row;
                for tri in [[i0, i1, i2], [i0, i2, i3]] {
                    let center = tri
                        .iter()
                        .map(|&i| vertices[i as usize])
                        .sum::<Vec3>()
                        / 3.0;
                    polygons.push(Polygon::with_attributes(
                        tri.to_vec(),
                        tri_area,
                        Vec3::Z,
                        center,
                    ));
                }
            }
        }

        Self {
            vertices,
            polygons,
            world: Affine3A::IDENTITY,
        }
    }

    /// Sets the local-to-world transform.
    pub fn with_world_transform(mut self, world: Affine3A) -> Self {
        self.world = world;
        self
    }

    /// Sum of all polygon areas in local units.
    pub fn total_area(&self) -> f32 {
        self.polygons.iter().map(|p| p.area).sum()
    }

    /// Corner positions of a polygon in local space.
    pub fn polygon_positions<'a>(
        &'a self,
        polygon: &'a Polygon,
    ) -> impl Iterator<Item = Vec3> + 'a {
        polygon
            .vertices
            .iter()
            .map(move |&i| self.vertices[i as usize])
    }

    #[inline]
    pub fn to_world_point(&self, p: Vec3) -> Vec3 {
        self.world.transform_point3(p)
    }

    /// Transforms a local normal with the inverse transpose of the linear part.
    pub fn to_world_normal(&self, n: Vec3) -> Vec3 {
        let linear = Mat3::from(self.world.matrix3);
        let normal_matrix = if linear.determinant().abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            linear
        };
        (normal_matrix * n).normalize_or_zero()
    }
}
