//! Download of the artifact a completed job points to.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use midigate_models::ResultReference;

use crate::error::{QueueError, QueueResult};
use crate::metrics;

/// Pull the result URL out of a completed job's output.
///
/// A missing or non-string key fails with [`QueueError::MissingResult`]
/// and no fetch is attempted.
pub fn extract_result_reference(output: &Value, key: &str) -> QueueResult<ResultReference> {
    let raw = output
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| QueueError::MissingResult(key.to_string()))?;

    ResultReference::parse(raw).map_err(|e| QueueError::InvalidResponse(e.to_string()))
}

/// Fetches final artifacts with a single unauthenticated GET.
#[derive(Clone)]
pub struct ResultFetcher {
    http: Client,
}

impl ResultFetcher {
    pub fn new(timeout: Duration) -> QueueResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(QueueError::Network)?;
        Ok(Self { http })
    }

    /// Download the full artifact body.
    pub async fn fetch(&self, reference: &ResultReference) -> QueueResult<Bytes> {
        debug!("Fetching result from {}", reference);

        let response = self
            .http
            .get(reference.as_str())
            .send()
            .await
            .map_err(|e| QueueError::ResultFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(QueueError::ResultFetch(format!(
                "{} returned {}",
                reference,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| QueueError::ResultFetch(e.to_string()))?;

        metrics::record_fetch_bytes(body.len());
        Ok(body)
    }
}
