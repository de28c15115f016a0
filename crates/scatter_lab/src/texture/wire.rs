//! JSON wire contract of the prediction service.
//!
//! Submission: `POST {base}/predictions` with `{version, input}`, answered by
//! `{id, status}` or a rejection carrying `detail`. Status: `GET {base}/predictions/{id}`,
//! answered by `{status, output, error}` where `output` is a URL, a list of URLs or a map
//! of name to URL.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::texture::job::{JobId, JobKind, PollOutcome};
use crate::texture::{GenerationParams, MapName, TextureMaps};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub version: String,
    pub input: PredictionInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionInput {
    Generate(GenerateInput),
    DerivePbr(DerivePbrInput),
}

/// Inputs of the text-to-texture model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateInput {
    pub prompt: String,
    pub seamless: bool,
    pub guidance_scale: f32,
    pub num_inference_steps: u32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Inputs of the PBR derivation model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivePbrInput {
    pub image: String,
    pub seamless: bool,
}

impl PredictionRequest {
    /// Base-color request with the material-enriched prompt.
    pub fn generate(version: impl Into<String>, params: &GenerationParams) -> Self {
        Self {
            version: version.into(),
            input: PredictionInput::Generate(GenerateInput {
                prompt: params.effective_prompt(),
                seamless: params.seamless,
                guidance_scale: params.guidance_scale,
                num_inference_steps: params.num_inference_steps,
                width: params.resolution,
                height: params.resolution,
                seed: params.seed,
            }),
        }
    }

    pub fn derive_pbr(
        version: impl Into<String>,
        image_url: impl Into<String>,
        seamless: bool,
    ) -> Self {
        Self {
            version: version.into(),
            input: PredictionInput::DerivePbr(DerivePbrInput {
                image: image_url.into(),
                seamless,
            }),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self.input {
            PredictionInput::Generate(_) => JobKind::BaseColor,
            PredictionInput::DerivePbr(_) => JobKind::PbrDerive,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub status: String,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Url(String),
    List(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl PredictionOutput {
    /// Assigns URLs to map names.
    ///
    /// A single URL is the job's primary map: base color for the base job, normal for the
    /// PBR job. Lists are read in job order: `[base_color]` or `[normal, roughness,
    /// height, ao]`. Unknown names in a map are dropped.
    pub fn into_maps(self, kind: JobKind) -> TextureMaps {
        let order: &[MapName] = match kind {
            JobKind::BaseColor => &[MapName::BaseColor],
            JobKind::PbrDerive => &MapName::DERIVED,
        };
        let mut maps = TextureMaps::new();
        match self {
            PredictionOutput::Url(url) => {
                if !url.is_empty() {
                    maps.insert(order[0], url);
                }
            }
            PredictionOutput::List(urls) => {
                for (name, url) in order.iter().zip(urls) {
                    if !url.is_empty() {
                        maps.insert(*name, url);
                    }
                }
            }
            PredictionOutput::Named(named) => {
                for (key, url) in named {
                    match MapName::from_key(&key) {
                        Some(name) if !url.is_empty() => {
                            maps.insert(name, url);
                        }
                        _ => debug!("Ignoring output entry '{key}'."),
                    }
                }
            }
        }
        maps
    }
}

/// Status reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl RemoteStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starting" => Some(RemoteStatus::Starting),
            "processing" => Some(RemoteStatus::Processing),
            "succeeded" => Some(RemoteStatus::Succeeded),
            "failed" => Some(RemoteStatus::Failed),
            "canceled" | "cancelled" => Some(RemoteStatus::Canceled),
            _ => None,
        }
    }
}

/// Reads a submission response body.
pub fn parse_submit(body: &str) -> Result<JobId> {
    let response: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| Error::Submission(format!("malformed response: {e}")))?;
    match response.id {
        Some(id) if !id.is_empty() => Ok(JobId::new(id)),
        _ => Err(Error::Submission(
            response.detail.unwrap_or_else(|| "Unknown error".into()),
        )),
    }
}

/// Reads a status response body of a job of `kind`.
pub fn parse_poll(body: &str, kind: JobKind) -> Result<PollOutcome> {
    let response: PredictionResponse = serde_json::from_str(body)
        .map_err(|e| Error::Poll(format!("malformed response: {e}")))?;
    response.into_outcome(kind)
}

impl PredictionResponse {
    pub fn into_outcome(self, kind: JobKind) -> Result<PollOutcome> {
        match RemoteStatus::parse(&self.status) {
            Some(RemoteStatus::Succeeded) => {
                let maps = self
                    .output
                    .map(|o| o.into_maps(kind))
                    .unwrap_or_default();
                if maps.is_empty() {
                    return Err(Error::Poll("no output image URL".into()));
                }
                Ok(PollOutcome::Succeeded(maps))
            }
            Some(RemoteStatus::Failed) => Ok(PollOutcome::Failed(
                self.error.unwrap_or_else(|| "generation failed".into()),
            )),
            Some(RemoteStatus::Canceled) => Ok(PollOutcome::Failed(
                self.error.unwrap_or_else(|| "generation was canceled".into()),
            )),
            Some(RemoteStatus::Starting | RemoteStatus::Processing) => Ok(PollOutcome::Pending),
            None => {
                debug!("Unknown prediction status '{}'; still waiting.", self.status);
                Ok(PollOutcome::Pending)
            }
        }
    }
}
