//! Length-weighted candidate sampling along polylines.
use rand::RngCore;

use crate::geometry::{PathCurve, PathSegment};
use crate::sampling::{rand01, Candidate, CandidateFrame, CandidateSampling, CumulativeTable};

/// Draws a uniform distance along the combined world-space length of a [`PathCurve`]
/// and interpolates within the containing segment.
#[derive(Debug, Clone)]
pub struct PathSampler {
    segments: Vec<PathSegment>,
    lengths: CumulativeTable,
}

impl PathSampler {
    pub fn new(curve: &PathCurve) -> Self {
        let segments = curve.world_segments();
        let lengths = CumulativeTable::new(segments.iter().map(|s| s.length));
        Self { segments, lengths }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Point and segment index at arc length `distance` from the path start.
    pub fn point_at(&self, distance: f32) -> Option<(usize, glam::Vec3)> {
        let index = self.lengths.locate(distance)?;
        let segment = &self.segments[index];
        let t = ((distance - self.lengths.start_of(index)) / segment.length).clamp(0.0, 1.0);
        Some((index, segment.lerp(t)))
    }
}

impl CandidateSampling for PathSampler {
    fn measure(&self) -> f32 {
        self.lengths.total()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Candidate {
        let distance = rand01(rng) * self.lengths.total();
        match self.point_at(distance) {
            Some((index, position)) => Candidate {
                position,
                frame: CandidateFrame::PathTangent(self.segments[index].direction()),
            },
            None => Candidate {
                position: glam::Vec3::ZERO,
                frame: CandidateFrame::Free,
            },
        }
    }
}
