//! Direct backend HTTP client.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{BackendError, BackendResult};
use crate::types::{PingResponse, RelayRequest, RelayResponse};

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend
    pub base_url: String,
    /// Primary liveness path
    pub ping_path: String,
    /// Liveness path tried when the primary one fails
    pub health_path: String,
    /// Timeout for each liveness request
    pub ping_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            ping_path: "/ping".to_string(),
            health_path: "/health".to_string(),
            ping_timeout: Duration::from_secs(10),
        }
    }
}

impl BackendConfig {
    /// Create config from environment variables.
    pub fn from_env() -> BackendResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: std::env::var("BACKEND_URL")
                .map_err(|_| BackendError::ConfigError("BACKEND_URL not set".to_string()))?,
            ping_path: std::env::var("BACKEND_PING_PATH").unwrap_or(defaults.ping_path),
            health_path: std::env::var("BACKEND_HEALTH_PATH").unwrap_or(defaults.health_path),
            ping_timeout: Duration::from_secs(
                std::env::var("BACKEND_PING_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Client for the synchronous compute backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// Timeouts are set per request, since each endpoint has its own ceiling.
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let http = Client::builder().build().map_err(BackendError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> BackendResult<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Forward a file and its form fields to the backend.
    ///
    /// Successful responses come back with status and body untouched;
    /// non-2xx answers become [`BackendError::Upstream`].
    pub async fn relay(&self, request: &RelayRequest) -> BackendResult<RelayResponse> {
        let url = self.config.url(&request.endpoint_path);
        let data = tokio::fs::read(&request.file_path).await?;

        debug!(
            "Relaying {} ({} bytes) to {}",
            request.file_name,
            data.len(),
            url
        );

        let mut part = Part::bytes(data).file_name(request.file_name.clone());
        if let Some(ct) = &request.content_type {
            part = part.mime_str(ct)?;
        }

        let form = request
            .fields
            .iter()
            .fold(Form::new().part(request.file_field.clone(), part), |form, (k, v)| {
                form.text(k.clone(), v.clone())
            });

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(request.timeout.as_secs())
                } else {
                    BackendError::Network(e)
                }
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(status = %status, "Backend rejected {}", request.endpoint_path);
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        info!(
            status = %status,
            bytes = body.len(),
            "Relayed {} to {}",
            request.file_name,
            request.endpoint_path
        );
        Ok(RelayResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Check backend liveness, falling back to the secondary health path.
    pub async fn ping(&self) -> BackendResult<PingResponse> {
        let primary = self.probe(&self.config.ping_path).await;
        match primary {
            Ok(status) => {
                return Ok(PingResponse {
                    path: self.config.ping_path.clone(),
                    status,
                    fallback: false,
                })
            }
            Err(e) => warn!(
                "Backend ping on {} failed, trying {}: {}",
                self.config.ping_path, self.config.health_path, e
            ),
        }

        let status = self.probe(&self.config.health_path).await?;
        Ok(PingResponse {
            path: self.config.health_path.clone(),
            status,
            fallback: true,
        })
    }

    async fn probe(&self, path: &str) -> BackendResult<u16> {
        let response = self
            .http
            .get(self.config.url(path))
            .timeout(self.config.ping_timeout)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(BackendError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
