//! Job-queue error types.

use serde_json::Value;
use thiserror::Error;

use midigate_models::JobId;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to configure queue client: {0}")]
    ConfigError(String),

    #[error("Job submission failed: {0}")]
    Submission(String),

    #[error("Status query failed: {0}")]
    StatusQuery(String),

    #[error("Job {job_id} failed remotely")]
    JobFailed { job_id: JobId, details: Value },

    #[error("Job {job_id} did not finish after {attempts} status checks ({waited_secs}s)")]
    Timeout {
        job_id: JobId,
        attempts: u32,
        waited_secs: u64,
    },

    #[error("Job output is missing '{0}'")]
    MissingResult(String),

    #[error("Result fetch failed: {0}")]
    ResultFetch(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl QueueError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Details to surface to the caller alongside the error summary.
    ///
    /// Remote failure payloads are passed through verbatim.
    pub fn details(&self) -> Value {
        match self {
            QueueError::JobFailed { details, .. } => details.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_failed_details_are_verbatim() {
        let err = QueueError::JobFailed {
            job_id: JobId::from_string("job-1"),
            details: json!({ "reason": "bad input" }),
        };
        assert_eq!(err.details(), json!({ "reason": "bad input" }));
        assert_eq!(err.to_string(), "Job job-1 failed remotely");
    }

    #[test]
    fn test_other_details_use_message() {
        let err = QueueError::MissingResult("midi_file_url".to_string());
        assert_eq!(
            err.details(),
            Value::String("Job output is missing 'midi_file_url'".to_string())
        );
    }
}
