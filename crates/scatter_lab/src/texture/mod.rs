//! Remote texture generation: job model, chained poller and wire contract.
//!
//! A [`poller::TexturePoller`] submits a base-color job to a prediction service and, in
//! full-PBR mode, chains a second job deriving normal, roughness, height and AO maps from
//! the base image. The host drives it by calling [`poller::TexturePoller::tick`] from its
//! timer, at most one network round trip per call.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod client;
#[cfg(feature = "http")]
pub mod http;
pub mod job;
pub mod poller;
pub mod state;
pub mod wire;

pub use client::{download_maps, ApiConfig, ModelVersions, PredictionClient};
#[cfg(feature = "http")]
pub use http::ReplicateClient;
pub use job::{GenerationJob, JobId, JobKind, JobStatus, PollOutcome};
pub use poller::{GenerationEvent, GenerationSink, TexturePoller, Tick};
pub use state::{advance, Command, PollEvent, PollerState};

/// Name of one texture map produced by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapName {
    BaseColor,
    Normal,
    Roughness,
    Height,
    Ao,
}

impl MapName {
    pub const ALL: [MapName; 5] = [
        MapName::BaseColor,
        MapName::Normal,
        MapName::Roughness,
        MapName::Height,
        MapName::Ao,
    ];

    /// Maps derived by the PBR job, in the order a list output is read.
    pub const DERIVED: [MapName; 4] = [
        MapName::Normal,
        MapName::Roughness,
        MapName::Height,
        MapName::Ao,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapName::BaseColor => "base_color",
            MapName::Normal => "normal",
            MapName::Roughness => "roughness",
            MapName::Height => "height",
            MapName::Ao => "ao",
        }
    }

    /// Parses an output key, accepting a few common aliases.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "base_color" | "basecolor" | "albedo" | "diffuse" | "color" => Some(MapName::BaseColor),
            "normal" | "normal_map" => Some(MapName::Normal),
            "roughness" => Some(MapName::Roughness),
            "height" | "displacement" => Some(MapName::Height),
            "ao" | "ambient_occlusion" | "occlusion" => Some(MapName::Ao),
            _ => None,
        }
    }
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image URLs keyed by map name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureMaps {
    urls: BTreeMap<MapName, String>,
}

impl TextureMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps holding only a base-color image.
    pub fn base_color(url: impl Into<String>) -> Self {
        Self::new().with(MapName::BaseColor, url)
    }

    pub fn with(mut self, name: MapName, url: impl Into<String>) -> Self {
        self.insert(name, url);
        self
    }

    pub fn insert(&mut self, name: MapName, url: impl Into<String>) -> Option<String> {
        self.urls.insert(name, url.into())
    }

    pub fn get(&self, name: MapName) -> Option<&str> {
        self.urls.get(&name).map(String::as_str)
    }

    pub fn base_color_url(&self) -> Option<&str> {
        self.get(MapName::BaseColor)
    }

    /// Union of both sets; entries of `other` win on conflicts.
    pub fn merged(mut self, other: TextureMaps) -> Self {
        self.urls.extend(other.urls);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (MapName, &str)> {
        self.urls.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Material hint appended to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialType {
    Wood,
    #[default]
    Metal,
    Stone,
    Fabric,
    Plastic,
    Organic,
    SciFi,
    /// Free-form prompt without a material suffix.
    Other,
}

impl MaterialType {
    pub const ALL: [MaterialType; 8] = [
        MaterialType::Wood,
        MaterialType::Metal,
        MaterialType::Stone,
        MaterialType::Fabric,
        MaterialType::Plastic,
        MaterialType::Organic,
        MaterialType::SciFi,
        MaterialType::Other,
    ];

    /// Keyword used in the enriched prompt.
    pub fn keyword(&self) -> &'static str {
        match self {
            MaterialType::Wood => "wood",
            MaterialType::Metal => "metal",
            MaterialType::Stone => "stone",
            MaterialType::Fabric => "fabric",
            MaterialType::Plastic => "plastic",
            MaterialType::Organic => "organic",
            MaterialType::SciFi => "scifi",
            MaterialType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Wood => "Wood",
            MaterialType::Metal => "Metal",
            MaterialType::Stone => "Stone",
            MaterialType::Fabric => "Fabric",
            MaterialType::Plastic => "Plastic",
            MaterialType::Organic => "Organic",
            MaterialType::SciFi => "Sci-Fi",
            MaterialType::Other => "Other",
        }
    }
}

/// Whether to stop after the base image or chain the PBR derivation job.
///
/// Full-PBR runs need [`crate::texture::ModelVersions::pbr`] to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    #[default]
    BaseOnly,
    FullPbr,
}

/// Parameters of one texture generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct GenerationParams {
    pub prompt: String,
    pub material_type: MaterialType,
    /// Request a tileable texture.
    pub seamless: bool,
    /// Prompt adherence, `1.0..=20.0`.
    pub guidance_scale: f32,
    /// Denoising steps, `20..=100`.
    pub num_inference_steps: u32,
    /// Square output size in pixels.
    pub resolution: u32,
    /// Fixed seed, or `None` for a random one.
    pub seed: Option<u64>,
    pub mode: GenerationMode,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            material_type: MaterialType::default(),
            seamless: true,
            guidance_scale: 7.5,
            num_inference_steps: 50,
            resolution: 1024,
            seed: None,
            mode: GenerationMode::default(),
        }
    }
}

impl GenerationParams {
    pub const GUIDANCE_RANGE: (f32, f32) = (1.0, 20.0);
    pub const STEPS_RANGE: (u32, u32) = (20, 100);
    pub const RESOLUTION_RANGE: (u32, u32) = (256, 2048);

    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_material_type(mut self, material_type: MaterialType) -> Self {
        self.material_type = material_type;
        self
    }

    pub fn with_seamless(mut self, seamless: bool) -> Self {
        self.seamless = seamless;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Prompt sent to the service, with the material suffix unless the type is `Other`.
    pub fn effective_prompt(&self) -> String {
        let prompt = self.prompt.trim();
        match self.material_type {
            MaterialType::Other => prompt.to_owned(),
            material => format!("{prompt}, {} material, PBR texture", material.keyword()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::Submission("please enter a prompt".into()));
        }
        let (g_min, g_max) = Self::GUIDANCE_RANGE;
        if !(g_min..=g_max).contains(&self.guidance_scale) {
            return Err(Error::InvalidConfig(format!(
                "guidance_scale must be within {g_min}..={g_max}"
            )));
        }
        let (s_min, s_max) = Self::STEPS_RANGE;
        if !(s_min..=s_max).contains(&self.num_inference_steps) {
            return Err(Error::InvalidConfig(format!(
                "num_inference_steps must be within {s_min}..={s_max}"
            )));
        }
        let (r_min, r_max) = Self::RESOLUTION_RANGE;
        if !(r_min..=r_max).contains(&self.resolution) || self.resolution % 64 != 0 {
            return Err(Error::InvalidConfig(format!(
                "resolution must be a multiple of 64 within {r_min}..={r_max}"
            )));
        }
        Ok(())
    }
}
