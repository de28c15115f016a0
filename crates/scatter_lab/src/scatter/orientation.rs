//! Orientation helpers for placements.
//!
//! Rotations use the XYZ Euler convention of the host: X is applied first, then Y, then Z,
//! so `R = Rz · Ry · Rx`.
use glam::{EulerRot, Quat, Vec3};
use rand::RngCore;

use crate::sampling::rand_range;

/// Cross products shorter than this are treated as parallel axes.
pub const ALIGN_EPSILON: f32 = 1e-4;

/// Rotation taking `from` onto `to` via the axis `from × to`.
///
/// Returns the identity when the axis is shorter than [`ALIGN_EPSILON`], which covers
/// both parallel and anti-parallel vectors as well as a zero `to`.
pub fn align_axis(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    let axis = from.cross(to);
    if axis.length() <= ALIGN_EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis.normalize(), from.angle_between(to))
}

/// Aligns `local_axis` to `target`, then spins about the aligned axis by `spin_deg` degrees.
///
/// The spin is applied even when `target` is parallel to `local_axis`, so every aligned
/// placement consumes one rotation draw.
pub fn align_with_spin(local_axis: Vec3, target: Vec3, spin_deg: f32) -> Quat {
    align_axis(local_axis, target) * Quat::from_axis_angle(local_axis, spin_deg.to_radians())
}

/// Builds a rotation from XYZ Euler angles in degrees.
pub fn from_euler_deg(x_deg: f32, y_deg: f32, z_deg: f32) -> Quat {
    Quat::from_rotation_z(z_deg.to_radians())
        * Quat::from_rotation_y(y_deg.to_radians())
        * Quat::from_rotation_x(x_deg.to_radians())
}

/// XYZ Euler angles in radians for `rotation`.
pub fn to_euler_xyz(rotation: Quat) -> Vec3 {
    let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
    Vec3::new(x, y, z)
}

/// Independent X, Y and Z angles in `[0, 360)` degrees.
pub fn random_euler(rng: &mut dyn RngCore) -> Quat {
    let x = rand_range(rng, 0.0, 360.0);
    let y = rand_range(rng, 0.0, 360.0);
    let z = rand_range(rng, 0.0, 360.0);
    from_euler_deg(x, y, z)
}

/// X and Y in `[0, 360)`, Z within `[min_deg, max_deg]`.
pub fn random_euler_with_z_range(rng: &mut dyn RngCore, min_deg: f32, max_deg: f32) -> Quat {
    let x = rand_range(rng, 0.0, 360.0);
    let y = rand_range(rng, 0.0, 360.0);
    let z = rand_range(rng, min_deg, max_deg);
    from_euler_deg(x, y, z)
}
