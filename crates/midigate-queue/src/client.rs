//! Job-queue HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use midigate_models::{JobId, StagedUrl};

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::orchestrator::JobStatusSource;
use crate::types::{RunRequest, RunResponse, StatusResponse};

/// Client for the remote job queue.
///
/// Every call is authenticated with the same bearer token.
#[derive(Clone)]
pub struct QueueClient {
    http: Client,
    config: QueueConfig,
}

impl QueueClient {
    /// Create a new queue client.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        if config.endpoint_id.is_empty() || config.api_key.is_empty() {
            return Err(QueueError::config_error("endpoint id and API key are required"));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(QueueError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env()?)
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Submit a job whose input references the staged URL.
    pub async fn submit(&self, staged: &StagedUrl) -> QueueResult<JobId> {
        let url = format!("{}/run", self.config.endpoint_url());
        let request = RunRequest::single(&self.config.input_key, staged.as_str());

        debug!("Submitting job to {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| QueueError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::Submission(format!(
                "queue returned {}: {}",
                status, body
            )));
        }

        let run: RunResponse = response
            .json()
            .await
            .map_err(|e| QueueError::Submission(format!("unreadable response: {}", e)))?;

        match run.id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(JobId::from_string(id)),
            None => Err(QueueError::Submission(
                "response carried no job id".to_string(),
            )),
        }
    }

    /// Query the status of a job once.
    pub async fn status(&self, job_id: &JobId) -> QueueResult<StatusResponse> {
        let url = format!("{}/status/{}", self.config.endpoint_url(), job_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| QueueError::StatusQuery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::StatusQuery(format!(
                "queue returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| QueueError::InvalidResponse(e.to_string()))
    }

    /// Ask the queue to cancel a job. Best effort.
    pub async fn cancel(&self, job_id: &JobId) -> QueueResult<()> {
        let url = format!("{}/cancel/{}", self.config.endpoint_url(), job_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QueueError::InvalidResponse(format!(
                "cancel returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Check if the queue endpoint is reachable.
    pub async fn health_check(&self) -> QueueResult<bool> {
        let url = format!("{}/health", self.config.endpoint_url());

        match self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                warn!("Job queue health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Job queue health check error: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl JobStatusSource for QueueClient {
    async fn job_status(&self, job_id: &JobId) -> QueueResult<StatusResponse> {
        self.status(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollPolicy;
    use crate::logging::JobLogger;
    use crate::orchestrator::poll_job;
    use midigate_models::JobStatus;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> QueueConfig {
        QueueConfig {
            base_url,
            endpoint_id: "ep1".to_string(),
            api_key: "token".to_string(),
            ..Default::default()
        }
    }

    fn staged() -> StagedUrl {
        StagedUrl::parse("https://files.example.com/song.wav").unwrap()
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(matches!(
            QueueClient::new(QueueConfig::default()),
            Err(QueueError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_sends_input_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ep1/run"))
            .and(header("authorization", "Bearer token"))
            .and(body_json(json!({
                "input": { "audio_file_url": "https://files.example.com/song.wav" }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "job-42", "status": "IN_QUEUE" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = QueueClient::new(test_config(server.uri())).unwrap();
        let job_id = client.submit(&staged()).await.unwrap();
        assert_eq!(job_id.as_str(), "job-42");
    }

    #[tokio::test]
    async fn test_submit_without_id_is_submission_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ep1/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "IN_QUEUE" })))
            .mount(&server)
            .await;

        let client = QueueClient::new(test_config(server.uri())).unwrap();
        let err = client.submit(&staged()).await.unwrap_err();
        assert!(matches!(err, QueueError::Submission(_)));
    }

    #[tokio::test]
    async fn test_submit_http_error_is_submission_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ep1/run"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = QueueClient::new(test_config(server.uri())).unwrap();
        let err = client.submit(&staged()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_status_parses_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ep1/status/job-42"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "job-42",
                "status": "COMPLETED",
                "output": { "midi_file_url": "https://x/y.mid" }
            })))
            .mount(&server)
            .await;

        let client = QueueClient::new(test_config(server.uri())).unwrap();
        let status = client.status(&JobId::from_string("job-42")).await.unwrap();
        assert_eq!(status.status, JobStatus::Completed);
        assert_eq!(status.output.unwrap()["midi_file_url"], "https://x/y.mid");
    }

    #[tokio::test]
    async fn test_null_status_keeps_polling_until_completed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ep1/status/job-42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "job-42", "status": null })),
            )
            .up_to_n_times(1)
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ep1/status/job-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "COMPLETED",
                "output": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = QueueClient::new(test_config(server.uri())).unwrap();
        let job_id = JobId::from_string("job-42");
        let logger = JobLogger::new(&job_id, "poll");
        let policy = PollPolicy::new(Duration::from_millis(5), 5);

        let outcome = poll_job(&client, &job_id, policy, &logger).await.unwrap();
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.label(), "completed");
    }

    #[tokio::test]
    async fn test_health_check_reports_unreachable_as_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ep1/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = QueueClient::new(test_config(server.uri())).unwrap();
        assert!(!client.health_check().await.unwrap());
    }
}
