#![forbid(unsafe_code)]
//! scatter_lab: object scattering over surfaces, volumes and paths, plus a polling client
//! for remote PBR texture generation.
//!
//! Modules:
//! - geometry: host-supplied meshes, polylines and boxes with world transforms
//! - sampling: area, volume and length weighted candidate sampling
//! - scatter: items, config, overlap rejection, orientation, runner, events
//! - texture: generation parameters, chained job state machine, poller, HTTP transport
pub mod error;
pub mod geometry;
pub mod sampling;
pub mod scatter;
pub mod texture;

/// Convenient re-exports for common types. Import with `use scatter_lab::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{PathCurve, Polygon, SurfaceMesh, VolumeBox};
    pub use crate::sampling::{
        CandidateSampling, PathSampler, SurfaceSampler, UniformBoxSampling,
    };
    pub use crate::scatter::config::{ScatterConfig, ScatterMethod, ScatterTarget};
    pub use crate::scatter::events::{
        EventSink, FnSink, MultiSink, ScatterEvent, ScatterEventKind, VecSink,
    };
    pub use crate::scatter::runner::{
        run_scatter, run_scatter_with_events, CandidateOutcome, ItemPlacements, Placement,
        RunResult, ScatterRunner,
    };
    pub use crate::scatter::{DensityScale, ObjectRef, ScatterItem};
    pub use crate::texture::client::DEFAULT_POLL_INTERVAL;
    #[cfg(feature = "http")]
    pub use crate::texture::ReplicateClient;
    pub use crate::texture::{
        download_maps, ApiConfig, GenerationEvent, GenerationMode, GenerationParams,
        GenerationSink, MapName, MaterialType, PredictionClient, TextureMaps, TexturePoller,
        Tick,
    };
}
