//! Runner producing placements for every item of a [`ScatterConfig`].
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sampling::{
    rand_range, Candidate, CandidateFrame, CandidateSampling, PathSampler, SurfaceSampler,
    UniformBoxSampling,
};
use crate::scatter::config::{ScatterConfig, ScatterTarget};
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::orientation::{
    align_with_spin, random_euler, random_euler_with_z_range, to_euler_xyz,
};
use crate::scatter::overlap::OverlapGuard;
use crate::scatter::{ObjectRef, ScatterItem};

/// One instance to create: which object, where, how rotated and how large.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub object: ObjectRef,
    /// Index of the producing item in [`ScatterConfig::items`].
    pub item_index: usize,
    /// World-space position.
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform scale factor.
    pub scale: f32,
}

impl Placement {
    /// Rotation as XYZ Euler angles in radians.
    pub fn euler_xyz(&self) -> Vec3 {
        to_euler_xyz(self.rotation)
    }

    pub fn scale_vector(&self) -> Vec3 {
        Vec3::splat(self.scale)
    }
}

/// Result of a scatter run.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Placements in item order, then candidate order.
    pub placements: Vec<Placement>,
    /// Total candidates drawn.
    pub candidates_evaluated: usize,
    /// Candidates dropped by overlap rejection.
    pub candidates_rejected: usize,
    /// Items skipped because no object was assigned.
    pub items_skipped: usize,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placements of one item.
    pub fn for_item(&self, item_index: usize) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(move |p| p.item_index == item_index)
    }
}

/// Outcome of a single candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Accepted(Placement),
    /// Dropped by overlap rejection at this world position.
    Rejected(Vec3),
}

#[derive(Debug, Clone)]
enum TargetSampler<'a> {
    Surface(SurfaceSampler<'a>),
    Volume(UniformBoxSampling),
    Path(PathSampler),
}

impl<'a> TargetSampler<'a> {
    fn for_target(target: &'a ScatterTarget) -> Self {
        match target {
            ScatterTarget::Mesh(mesh) => TargetSampler::Surface(SurfaceSampler::new(mesh)),
            ScatterTarget::Volume(volume) => {
                TargetSampler::Volume(UniformBoxSampling::new(*volume))
            }
            ScatterTarget::Path(curve) => TargetSampler::Path(PathSampler::new(curve)),
        }
    }
}

impl CandidateSampling for TargetSampler<'_> {
    fn measure(&self) -> f32 {
        match self {
            TargetSampler::Surface(s) => s.measure(),
            TargetSampler::Volume(s) => s.measure(),
            TargetSampler::Path(s) => s.measure(),
        }
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Candidate {
        match self {
            TargetSampler::Surface(s) => s.sample(rng),
            TargetSampler::Volume(s) => s.sample(rng),
            TargetSampler::Path(s) => s.sample(rng),
        }
    }
}

/// Validated scatter run over one config.
pub struct ScatterRunner<'a> {
    config: &'a ScatterConfig,
    sampler: TargetSampler<'a>,
}

impl<'a> ScatterRunner<'a> {
    /// Validates `config` and resolves its target.
    ///
    /// Fails with [`crate::error::Error::NoItems`] for an empty item list,
    /// [`crate::error::Error::InvalidConfig`] for bad parameters and
    /// [`crate::error::Error::InvalidTarget`] for a missing, mismatched or degenerate target.
    pub fn try_new(config: &'a ScatterConfig) -> Result<Self> {
        config.validate()?;
        let target = config.resolve_target()?;
        Ok(Self {
            config,
            sampler: TargetSampler::for_target(target),
        })
    }

    pub fn config(&self) -> &ScatterConfig {
        self.config
    }

    /// Area, volume or length of the target.
    pub fn measure(&self) -> f32 {
        self.sampler.measure()
    }

    /// Number of candidates drawn for `item`.
    pub fn candidate_count(&self, item: &ScatterItem) -> usize {
        let n = self.measure() * item.density * self.config.density_factor();
        if n.is_finite() && n > 0.0 {
            n.floor() as usize
        } else {
            0
        }
    }

    /// Lazy placements of a single item, or `None` if the index is out of range or the
    /// item has no object.
    ///
    /// Hosts can pull a bounded number of placements per event-loop tick.
    pub fn item_placements(&self, item_index: usize) -> Option<ItemPlacements<'_>> {
        let item = self.config.items.get(item_index)?;
        let object = item.object.clone()?;
        let guard = self
            .config
            .avoid_overlap
            .then(|| OverlapGuard::new(self.config.min_distance));

        Some(ItemPlacements {
            sampler: &self.sampler,
            item,
            item_index,
            object,
            rng: StdRng::seed_from_u64(item.seed),
            remaining: self.candidate_count(item),
            guard,
            path_offset: self.config.path_offset,
            evaluated: 0,
            rejected: 0,
        })
    }

    /// Runs every item, returning the result.
    pub fn run(&self) -> RunResult {
        self.run_with_events(&mut ())
    }

    pub fn run_with_events(&self, sink: &mut dyn EventSink) -> RunResult {
        if sink.wants(ScatterEventKind::RunStarted) {
            sink.send(ScatterEvent::RunStarted {
                method: self.config.method,
                item_count: self.config.items.len(),
                measure: self.measure(),
            });
        }

        let mut result = RunResult::new();

        for (index, item) in self.config.items.iter().enumerate() {
            let Some(mut placements) = self.item_placements(index) else {
                debug!("Item {index} has no object; skipping.");
                result.items_skipped += 1;
                if sink.wants(ScatterEventKind::ItemSkipped) {
                    sink.send(ScatterEvent::ItemSkipped { index });
                }
                continue;
            };

            let candidates = placements.remaining();
            if candidates == 0 {
                warn!(
                    "Item {} ('{}') yields no candidates for a target measure of {}.",
                    index,
                    placements.object(),
                    self.measure()
                );
                if sink.wants(ScatterEventKind::Warning) {
                    sink.send(ScatterEvent::Warning {
                        context: format!("item:{index}"),
                        message: "Density too low for target size; nothing placed".into(),
                    });
                }
            }
            if sink.wants(ScatterEventKind::ItemStarted) {
                sink.send(ScatterEvent::ItemStarted {
                    index,
                    object: placements.object().clone(),
                    candidates,
                });
            }

            let mut placed = 0usize;
            while let Some(outcome) = placements.next_outcome() {
                match outcome {
                    CandidateOutcome::Accepted(placement) => {
                        placed += 1;
                        if sink.wants(ScatterEventKind::PlacementMade) {
                            sink.send(ScatterEvent::PlacementMade {
                                placement: placement.clone(),
                            });
                        }
                        result.placements.push(placement);
                    }
                    CandidateOutcome::Rejected(position) => {
                        if sink.wants(ScatterEventKind::CandidateRejected) {
                            sink.send(ScatterEvent::CandidateRejected {
                                item_index: index,
                                position,
                            });
                        }
                    }
                }
            }

            result.candidates_evaluated += placements.evaluated();
            result.candidates_rejected += placements.rejected();

            info!(
                "Item {}: '{}' | density: {} | candidates: {} | placed: {} | rejected: {}.",
                index,
                placements.object(),
                item.density,
                candidates,
                placed,
                placements.rejected(),
            );

            if sink.wants(ScatterEventKind::ItemFinished) {
                sink.send(ScatterEvent::ItemFinished {
                    index,
                    placed,
                    rejected: placements.rejected(),
                });
            }
        }

        if sink.wants(ScatterEventKind::RunFinished) {
            sink.send(ScatterEvent::RunFinished {
                result: result.clone(),
            });
        }

        result
    }
}

/// Lazily draws the candidates of one item with its own seeded random stream.
pub struct ItemPlacements<'r> {
    sampler: &'r dyn CandidateSampling,
    item: &'r ScatterItem,
    item_index: usize,
    object: ObjectRef,
    rng: StdRng,
    remaining: usize,
    guard: Option<OverlapGuard>,
    path_offset: f32,
    evaluated: usize,
    rejected: usize,
}

impl ItemPlacements<'_> {
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// Candidates not yet drawn.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Draws the next candidate and reports whether it was placed.
    pub fn next_outcome(&mut self) -> Option<CandidateOutcome> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.evaluated += 1;

        let item = self.item;
        let rng: &mut dyn RngCore = &mut self.rng;
        let candidate = self.sampler.sample(rng);
        let mut position = candidate.position;

        if let CandidateFrame::PathTangent(tangent) = candidate.frame {
            if !item.align_to_normal && self.path_offset > 0.0 {
                let lateral = Vec3::new(-tangent.y, tangent.x, 0.0).normalize_or_zero();
                if lateral != Vec3::ZERO {
                    position += lateral * rand_range(rng, -self.path_offset, self.path_offset);
                }
            }
        }

        if let Some(guard) = self.guard.as_mut() {
            if !guard.try_insert(position) {
                self.rejected += 1;
                return Some(CandidateOutcome::Rejected(position));
            }
        }

        let [rot_min, rot_max] = item.rotation_range;
        let rotation = match candidate.frame {
            CandidateFrame::SurfaceNormal(normal) if item.align_to_normal => {
                align_with_spin(Vec3::Z, normal, rand_range(rng, rot_min, rot_max))
            }
            CandidateFrame::PathTangent(tangent) if item.align_to_normal => {
                align_with_spin(Vec3::Y, tangent, rand_range(rng, rot_min, rot_max))
            }
            CandidateFrame::Free => random_euler_with_z_range(rng, rot_min, rot_max),
            _ => random_euler(rng),
        };

        let [scale_min, scale_max] = item.scale_range;
        let scale = rand_range(rng, scale_min, scale_max);

        Some(CandidateOutcome::Accepted(Placement {
            object: self.object.clone(),
            item_index: self.item_index,
            position,
            rotation,
            scale,
        }))
    }
}

impl Iterator for ItemPlacements<'_> {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        loop {
            match self.next_outcome()? {
                CandidateOutcome::Accepted(p) => return Some(p),
                CandidateOutcome::Rejected(_) => continue,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Validates `config` and runs every item.
pub fn run_scatter(config: &ScatterConfig) -> Result<RunResult> {
    Ok(ScatterRunner::try_new(config)?.run())
}

/// Like [`run_scatter`], streaming progress into `sink`.
pub fn run_scatter_with_events(
    config: &ScatterConfig,
    sink: &mut dyn EventSink,
) -> Result<RunResult> {
    Ok(ScatterRunner::try_new(config)?.run_with_events(sink))
}
