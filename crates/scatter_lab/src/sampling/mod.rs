//! Candidate sampling over scatter targets.
//!
//! Each target kind has a sampler that proposes world-space candidate positions
//! together with the local frame (surface normal or path tangent) at that point.
//! The scatter runner decides how many candidates to draw from the sampler's
//! [`CandidateSampling::measure`] and applies overlap rejection and orientation.
use glam::Vec3;
use rand::RngCore;

pub mod barycentric;
pub mod cumulative;
pub mod path;
pub mod surface;
pub mod uniform_box;

pub use barycentric::Barycentric;
pub use cumulative::CumulativeTable;
pub use path::PathSampler;
pub use surface::SurfaceSampler;
pub use uniform_box::UniformBoxSampling;

/// Local frame information attached to a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateFrame {
    /// No preferred direction (volume scatter).
    Free,
    /// World-space unit normal of the sampled face.
    SurfaceNormal(Vec3),
    /// World-space unit tangent of the sampled path segment.
    PathTangent(Vec3),
}

/// A proposed placement position before rejection and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Vec3,
    pub frame: CandidateFrame,
}

/// Trait for candidate sampling over a target.
pub trait CandidateSampling {
    /// Size of the sampled domain: area for surfaces, volume for boxes, length for paths.
    fn measure(&self) -> f32;

    fn sample(&self, rng: &mut dyn RngCore) -> Candidate;
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Generate a random float in `[min, max)`.
#[inline]
pub(crate) fn rand_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + rand01(rng) * (max - min)
}

/// Compute the next smaller representable float value.
///
/// Returns a value that is strictly less than the input, useful for
/// ensuring bounds are strictly inside a domain.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }

    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }

    if val == f32::INFINITY {
        return f32::MAX;
    }

    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}

#[cfg(test)]
pub(crate) mod test_rng {
    use rand::RngCore;

    /// Returns the same word forever.
    pub(crate) struct FixedRng {
        pub(crate) value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    /// Replays a fixed list of unit-interval draws, cycling when exhausted.
    pub(crate) struct ScriptedRng {
        values: Vec<u32>,
        next: usize,
    }

    impl ScriptedRng {
        pub(crate) fn from_unit(draws: &[f32]) -> Self {
            let values = draws
                .iter()
                .map(|d| (d * (u32::MAX as f32 + 1.0)) as u32)
                .collect();
            Self { values, next: 0 }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }

        fn next_u64(&mut self) -> u64 {
            self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(4) {
                let bytes = self.next_u32().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }
}
