//! Staging client implementation.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use midigate_models::StagedUrl;

use crate::error::{StorageError, StorageResult};
use crate::signature;

/// Configuration for the staging client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Upload API base URL
    pub base_url: String,
    /// Account (cloud) name
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used for request signing
    pub api_secret: String,
    /// Optional folder to place staged uploads in
    pub folder: Option<String>,
    /// Upload request timeout
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: None,
            timeout: Duration::from_secs(120),
        }
    }
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            base_url: std::env::var("CLOUDINARY_BASE_URL")
                .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME")
                .map_err(|_| StorageError::config_error("CLOUDINARY_CLOUD_NAME not set"))?,
            api_key: std::env::var("CLOUDINARY_API_KEY")
                .map_err(|_| StorageError::config_error("CLOUDINARY_API_KEY not set"))?,
            api_secret: std::env::var("CLOUDINARY_API_SECRET")
                .map_err(|_| StorageError::config_error("CLOUDINARY_API_SECRET not set"))?,
            folder: std::env::var("CLOUDINARY_FOLDER").ok().filter(|s| !s.is_empty()),
            timeout: Duration::from_secs(
                std::env::var("STORAGE_UPLOAD_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        })
    }

    /// Upload endpoint; the `auto` resource type lets the provider detect
    /// whether the file is audio, video, image or raw.
    fn upload_url(&self) -> String {
        format!(
            "{}/{}/auto/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    #[serde(default)]
    resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client that stages local files in object storage and returns their
/// public URL.
#[derive(Clone)]
pub struct StagingClient {
    http: Client,
    config: StorageConfig,
}

impl StagingClient {
    /// Create a new staging client from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(StorageError::config_error(
                "cloud name, API key and API secret are required",
            ));
        }

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(StorageConfig::from_env()?)
    }

    /// Upload a local file and return its public URL.
    ///
    /// The remote object is left in place after the request finishes.
    pub async fn stage(
        &self,
        path: impl AsRef<Path>,
        file_name: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StagedUrl> {
        let path = path.as_ref();
        debug!("Staging {} as {}", path.display(), file_name);

        let data = tokio::fs::read(path).await?;
        let size = data.len();

        let timestamp = Utc::now().timestamp().to_string();
        let folder = self.config.folder.clone().unwrap_or_default();
        let signed = [("folder", folder.clone()), ("timestamp", timestamp.clone())];
        let signature = signature::sign(&signed, &self.config.api_secret);

        let mut part = Part::bytes(data).file_name(file_name.to_string());
        if let Some(ct) = content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| StorageError::upload_failed(format!("invalid content type: {}", e)))?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);
        if !folder.is_empty() {
            form = form.text("folder", folder);
        }

        let response = self
            .http
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = %status, "Storage upload rejected: {}", message);
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let raw_url = uploaded
            .secure_url
            .or(uploaded.url)
            .ok_or_else(|| StorageError::InvalidResponse("response has no URL".to_string()))?;

        let staged = StagedUrl::parse(&raw_url)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        info!(
            bytes = size,
            resource_type = uploaded.resource_type.as_deref().unwrap_or("unknown"),
            "Staged {} at {}",
            file_name,
            staged
        );
        Ok(staged)
    }
}
