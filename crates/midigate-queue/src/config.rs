//! Job-queue configuration.

use std::time::Duration;

use crate::error::{QueueError, QueueResult};

/// Fixed-interval polling policy.
///
/// Each attempt waits `interval` and then queries status once, so the
/// longest wait is `interval * max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before every status query
    pub interval: Duration,
    /// Status queries before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 70,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Total wait ceiling across all attempts.
    pub fn ceiling(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Configuration for the job-queue client.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// API base URL (without the endpoint id)
    pub base_url: String,
    /// Queue endpoint identifier
    pub endpoint_id: String,
    /// Bearer token for every queue call
    pub api_key: String,
    /// Input payload key the remote worker reads the staged URL from
    pub input_key: String,
    /// Output payload key holding the result URL
    pub output_key: String,
    /// Polling policy
    pub poll: PollPolicy,
    /// Timeout for individual run/status calls
    pub request_timeout: Duration,
    /// Timeout for downloading the final artifact
    pub fetch_timeout: Duration,
    /// Ask the queue to cancel a job whose polling budget ran out
    pub cancel_on_timeout: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.runpod.ai/v2".to_string(),
            endpoint_id: String::new(),
            api_key: String::new(),
            input_key: "audio_file_url".to_string(),
            output_key: "midi_file_url".to_string(),
            poll: PollPolicy::default(),
            request_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(120),
            cancel_on_timeout: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: std::env::var("RUNPOD_BASE_URL").unwrap_or(defaults.base_url),
            endpoint_id: std::env::var("RUNPOD_ENDPOINT_ID")
                .map_err(|_| QueueError::config_error("RUNPOD_ENDPOINT_ID not set"))?,
            api_key: std::env::var("RUNPOD_API_KEY")
                .map_err(|_| QueueError::config_error("RUNPOD_API_KEY not set"))?,
            input_key: std::env::var("JOB_INPUT_KEY").unwrap_or(defaults.input_key),
            output_key: std::env::var("JOB_OUTPUT_KEY").unwrap_or(defaults.output_key),
            poll: PollPolicy {
                interval: env_parse("JOB_POLL_INTERVAL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.poll.interval),
                max_attempts: env_parse("JOB_POLL_MAX_ATTEMPTS")
                    .unwrap_or(defaults.poll.max_attempts),
            },
            request_timeout: env_parse("JOB_REQUEST_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            fetch_timeout: env_parse("FETCH_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            cancel_on_timeout: std::env::var("JOB_CANCEL_ON_TIMEOUT")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Base URL for this endpoint's routes.
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.endpoint_id)
    }
}
