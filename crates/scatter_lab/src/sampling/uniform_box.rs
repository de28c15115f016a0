//! Uniform random position sampling inside an axis-aligned box.
use glam::Vec3;
use rand::RngCore;

use crate::geometry::VolumeBox;
use crate::sampling::{next_down, rand01, Candidate, CandidateFrame, CandidateSampling};

/// Uniform i.i.d. random sampling over a [`VolumeBox`].
#[derive(Debug, Clone)]
pub struct UniformBoxSampling {
    pub volume: VolumeBox,
}

impl UniformBoxSampling {
    pub fn new(volume: VolumeBox) -> Self {
        Self { volume }
    }

    /// Draws `count` positions. Returns nothing for a degenerate box.
    pub fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Vec<Vec3> {
        if count == 0 || self.volume.is_degenerate() {
            return Vec::new();
        }
        (0..count).map(|_| self.draw(rng)).collect()
    }

    fn draw(&self, rng: &mut dyn RngCore) -> Vec3 {
        let (min, max) = self.volume.bounds();
        let size = self.volume.size;
        let u = rand01(rng);
        let v = rand01(rng);
        let w = rand01(rng);

        // Keep strictly inside the max faces.
        Vec3::new(
            (min.x + u * size.x).clamp(min.x, next_down(max.x)),
            (min.y + v * size.y).clamp(min.y, next_down(max.y)),
            (min.z + w * size.z).clamp(min.z, next_down(max.z)),
        )
    }
}

impl CandidateSampling for UniformBoxSampling {
    fn measure(&self) -> f32 {
        if self.volume.is_degenerate() {
            0.0
        } else {
            self.volume.volume()
        }
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Candidate {
        Candidate {
            position: self.draw(rng),
            frame: CandidateFrame::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn empty_for_zero_count_or_flat_box() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = UniformBoxSampling::new(VolumeBox::default());
        assert!(s.generate(0, &mut rng).is_empty());

        let flat = UniformBoxSampling::new(VolumeBox::new(Vec3::new(1.0, 0.0, 1.0), Vec3::ZERO));
        assert!(flat.generate(10, &mut rng).is_empty());
        assert_eq!(flat.measure(), 0.0);
    }

    #[test]
    fn count_and_bounds_are_respected() {
        let mut rng = StdRng::seed_from_u64(42);
        let volume = VolumeBox::new(Vec3::new(8.0, 6.0, 2.0), Vec3::new(10.0, 0.0, -3.0));
        let s = UniformBoxSampling::new(volume);
        let pts = s.generate(500, &mut rng);
        assert_eq!(pts.len(), 500);

        let (min, max) = volume.bounds();
        for p in pts {
            assert!(p.cmpge(min).all() && p.cmplt(max).all(), "{p:?} outside box");
        }
    }

    #[test]
    fn determinism_for_same_seed() {
        let s = UniformBoxSampling::new(VolumeBox::default());
        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);
        assert_eq!(s.generate(32, &mut rng_a), s.generate(32, &mut rng_b));

        let mut rng_c = StdRng::seed_from_u64(456);
        assert_ne!(s.generate(32, &mut rng_a), s.generate(32, &mut rng_c));
    }
}
