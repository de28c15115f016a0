//! Host-supplied geometry that scatter targets are built from.
//!
//! The host resolves its scene objects into these plain data types: polygon meshes for
//! surface scattering, polylines for path scattering and an axis-aligned box for volume
//! scattering. World transforms are carried alongside so sampling happens in world space.
pub mod mesh;
pub mod path;
pub mod volume;

pub use mesh::{Polygon, SurfaceMesh};
pub use path::{PathCurve, PathSegment};
pub use volume::VolumeBox;
