//! Blocking HTTP transport for the prediction service.
//!
//! Requests run on a private current-thread tokio runtime, each bounded by the configured
//! timeout, so a poller tick returns even when the service hangs.
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::texture::client::{ApiConfig, PredictionClient};
use crate::texture::job::{JobId, JobKind, PollOutcome};
use crate::texture::wire::{self, PredictionRequest};

/// [`PredictionClient`] talking to a Replicate-style API with `Authorization: Token <token>`.
pub struct ReplicateClient {
    config: ApiConfig,
    http: reqwest::Client,
    runtime: Runtime,
}

impl ReplicateClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Other(format!("failed to create runtime: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            config,
            http,
            runtime,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self
            .config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Submission("API token not set".into()))?;
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Token {token}"))
            .map_err(|_| Error::InvalidConfig("API token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Sends `request` and returns the status code and body, bounded by the timeout.
    fn send(&self, request: reqwest::RequestBuilder) -> std::result::Result<(u16, String), String> {
        let timeout = self.config.timeout;
        self.runtime.block_on(async move {
            let response = match tokio::time::timeout(timeout, request.send()).await {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) => return Err(format!("network error: {e}")),
                Err(_) => return Err(timed_out(timeout)),
            };
            let status = response.status().as_u16();
            match tokio::time::timeout(timeout, response.text()).await {
                Ok(Ok(body)) => Ok((status, body)),
                Ok(Err(e)) => Err(format!("failed to read response: {e}")),
                Err(_) => Err(timed_out(timeout)),
            }
        })
    }
}

fn timed_out(timeout: Duration) -> String {
    format!("request timed out after {}s", timeout.as_secs_f32())
}

impl PredictionClient for ReplicateClient {
    fn has_credential(&self) -> bool {
        self.config.has_token()
    }

    fn submit(&mut self, request: &PredictionRequest) -> Result<JobId> {
        let headers = self.auth_headers()?;
        let url = self.config.predictions_url();
        debug!("POST {url} ({})", request.kind().as_str());

        let builder = self.http.post(&url).headers(headers).json(request);
        let (status, body) = self.send(builder).map_err(|e| {
            warn!("Submission transport error: {e}");
            Error::Submission(e)
        })?;
        debug!("Submission answered with HTTP {status}.");
        wire::parse_submit(&body)
    }

    fn poll(&mut self, job: &JobId, kind: JobKind) -> Result<PollOutcome> {
        let headers = self.auth_headers().map_err(|e| Error::Poll(e.to_string()))?;
        let url = self.config.prediction_url(job);

        let builder = self.http.get(&url).headers(headers);
        let (status, body) = self.send(builder).map_err(|e| {
            warn!("Status check transport error: {e}");
            Error::Poll(e)
        })?;
        if !(200..300).contains(&status) {
            return Err(Error::Poll(format!("HTTP {status}")));
        }
        wire::parse_poll(&body, kind)
    }

    fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
        let timeout = self.config.timeout;
        let request = self.http.get(url);
        self.runtime.block_on(async move {
            let response = match tokio::time::timeout(timeout, request.send()).await {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) => return Err(Error::Other(format!("download failed: {e}"))),
                Err(_) => return Err(Error::Other(timed_out(timeout))),
            };
            if !response.status().is_success() {
                return Err(Error::Other(format!(
                    "download failed with HTTP {}",
                    response.status()
                )));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::Other(format!("failed to read image data: {e}")))?;
            Ok(bytes.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::GenerationParams;

    #[test]
    fn missing_token_fails_before_any_request() {
        // Unroutable base URL: a network attempt would surface a transport error instead.
        let config = ApiConfig::new().with_base_url("http://127.0.0.1:9");
        let mut client = ReplicateClient::new(config).unwrap();
        assert!(!client.has_credential());

        let request = PredictionRequest::generate("v", &GenerationParams::new("x"));
        let err = client.submit(&request).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to start texture generation: API token not set"
        );
    }

    #[test]
    fn auth_header_uses_token_scheme() {
        let client = ReplicateClient::new(ApiConfig::new().with_token("r8_abc")).unwrap();
        let headers = client.auth_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Token r8_abc");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }
}
