//! Transport seam and API configuration.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::texture::job::{JobId, JobKind, PollOutcome};
use crate::texture::wire::PredictionRequest;
use crate::texture::{MapName, TextureMaps};

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";

/// Seamless texture model used for base-color jobs.
pub const DEFAULT_BASE_MODEL_VERSION: &str =
    "cf40add0d299df23819762a7e3045e990e045d18f6ed25630e6e5583be68827f";

/// Interval at which the host should call [`crate::texture::TexturePoller::tick`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const TOKEN_ENV: &str = "REPLICATE_API_TOKEN";
pub const API_BASE_ENV: &str = "SCATTER_LAB_API_BASE";

/// One request/response exchange with the prediction service.
///
/// Each call is a single round trip. Implementations must not retry.
pub trait PredictionClient {
    /// Whether a credential is configured. Submissions are refused without one.
    fn has_credential(&self) -> bool {
        true
    }

    fn submit(&mut self, request: &PredictionRequest) -> Result<JobId>;

    fn poll(&mut self, job: &JobId, kind: JobKind) -> Result<PollOutcome>;

    /// Downloads the bytes behind an output URL.
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>>;
}

impl<C: PredictionClient + ?Sized> PredictionClient for &mut C {
    fn has_credential(&self) -> bool {
        (**self).has_credential()
    }

    fn submit(&mut self, request: &PredictionRequest) -> Result<JobId> {
        (**self).submit(request)
    }

    fn poll(&mut self, job: &JobId, kind: JobKind) -> Result<PollOutcome> {
        (**self).poll(job, kind)
    }

    fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// Model versions of the two chained jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersions {
    pub base: String,
    /// Required for full-PBR runs.
    pub pbr: Option<String>,
}

impl Default for ModelVersions {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_MODEL_VERSION.to_owned(),
            pbr: None,
        }
    }
}

/// Connection settings for the prediction service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub models: ModelVersions,
    /// Upper bound for a single request.
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_owned(),
            token: None,
            models: ModelVersions::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the token from `REPLICATE_API_TOKEN` and an optional base URL from
    /// `SCATTER_LAB_API_BASE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.token = Some(token);
        }
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.base_url = base;
            }
        }
        config
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_base_model(mut self, version: impl Into<String>) -> Self {
        self.models.base = version.into();
        self
    }

    pub fn with_pbr_model(mut self, version: impl Into<String>) -> Self {
        self.models.pbr = Some(version.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// A non-blank token is configured.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".into()));
        }
        if self.models.base.trim().is_empty() {
            return Err(Error::InvalidConfig("base model version must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be > 0".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig("poll_interval must be > 0".into()));
        }
        Ok(())
    }

    /// `{base}/predictions`
    pub fn predictions_url(&self) -> String {
        format!("{}/predictions", self.base_url.trim_end_matches('/'))
    }

    /// `{base}/predictions/{id}`
    pub fn prediction_url(&self, job: &JobId) -> String {
        format!("{}/{}", self.predictions_url(), job)
    }
}

/// Downloads every map into `dir` as `{stem}_{map}.png` and returns the written paths.
pub fn download_maps(
    client: &mut dyn PredictionClient,
    maps: &TextureMaps,
    dir: &Path,
    stem: &str,
) -> Result<Vec<(MapName, PathBuf)>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(maps.len());
    for (name, url) in maps.iter() {
        let bytes = client.fetch(url)?;
        let path = dir.join(format!("{stem}_{name}.png"));
        fs::write(&path, &bytes)?;
        info!("Saved {} map to {} ({} bytes).", name, path.display(), bytes.len());
        written.push((name, path));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct StaticFiles(HashMap<String, Vec<u8>>);

    impl PredictionClient for StaticFiles {
        fn submit(&mut self, _request: &PredictionRequest) -> Result<JobId> {
            Err(Error::Submission("offline".into()))
        }

        fn poll(&mut self, _job: &JobId, _kind: JobKind) -> Result<PollOutcome> {
            Err(Error::Poll("offline".into()))
        }

        fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Poll(format!("404 {url}")))
        }
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let config = ApiConfig::new().with_base_url("https://example.test/v1/");
        assert_eq!(config.predictions_url(), "https://example.test/v1/predictions");
        assert_eq!(
            config.prediction_url(&JobId::new("xyz")),
            "https://example.test/v1/predictions/xyz"
        );
    }

    #[test]
    fn blank_token_counts_as_missing() {
        assert!(!ApiConfig::new().has_token());
        assert!(!ApiConfig::new().with_token("  ").has_token());
        assert!(ApiConfig::new().with_token("r8_abc").has_token());
    }

    #[test]
    fn debug_output_hides_token() {
        let config = ApiConfig::new().with_token("r8_secret");
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("r8_secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_zero_durations() {
        assert!(ApiConfig::new().validate().is_ok());
        assert!(ApiConfig::new()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ApiConfig::new()
            .with_poll_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert_eq!(ApiConfig::new().poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn download_maps_writes_one_file_per_map() {
        let mut files = StaticFiles(HashMap::from([
            ("u/base".to_owned(), vec![1, 2, 3]),
            ("u/normal".to_owned(), vec![4]),
        ]));
        let maps = TextureMaps::base_color("u/base").with(MapName::Normal, "u/normal");
        let dir = std::env::temp_dir().join(format!("scatter_lab_dl_{}", std::process::id()));

        let written = download_maps(&mut files, &maps, &dir, "oak").unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].0, MapName::BaseColor);
        assert!(written[0].1.ends_with("oak_base_color.png"));
        assert_eq!(fs::read(&written[1].1).unwrap(), vec![4]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn download_maps_propagates_fetch_errors() {
        let mut files = StaticFiles(HashMap::new());
        let maps = TextureMaps::base_color("missing");
        let dir = std::env::temp_dir().join(format!("scatter_lab_dl_err_{}", std::process::id()));
        assert!(matches!(
            download_maps(&mut files, &maps, &dir, "x"),
            Err(Error::Poll(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
