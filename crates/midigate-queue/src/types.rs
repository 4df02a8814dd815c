//! Job-queue request/response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use midigate_models::JobStatus;

/// Body of `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub input: Map<String, Value>,
}

impl RunRequest {
    /// Build a request whose input carries a single string field.
    pub fn single(key: &str, value: impl Into<String>) -> Self {
        let mut input = Map::new();
        input.insert(key.to_string(), Value::String(value.into()));
        Self { input }
    }
}

/// Response of `POST /run`. Only the assigned id is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub id: Option<String>,
}

/// Response of `GET /status/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    /// Worker output; meaningful once the job is COMPLETED or FAILED
    #[serde(default)]
    pub output: Option<Value>,
    /// Error string some queues report alongside FAILED
    #[serde(default)]
    pub error: Option<Value>,
}

impl StatusResponse {
    /// Failure details to pass through: output, else error, else null.
    pub fn failure_details(&self) -> Value {
        self.output
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_request_shape() {
        let request = RunRequest::single("audio_file_url", "https://x/a.wav");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "input": { "audio_file_url": "https://x/a.wav" } })
        );
    }

    #[test]
    fn test_status_without_status_field_defaults_to_in_progress() {
        let status: StatusResponse = serde_json::from_value(json!({ "id": "j1" })).unwrap();
        assert_eq!(status.status, JobStatus::InProgress);
    }

    #[test]
    fn test_null_or_odd_status_values_still_decode() {
        let status: StatusResponse =
            serde_json::from_value(json!({ "id": "j1", "status": null })).unwrap();
        assert_eq!(status.status, JobStatus::InProgress);

        let status: StatusResponse =
            serde_json::from_value(json!({ "id": "j1", "status": 7 })).unwrap();
        assert_eq!(status.status, JobStatus::Other("7".to_string()));
    }

    #[test]
    fn test_failure_details_prefers_output() {
        let status: StatusResponse = serde_json::from_value(json!({
            "status": "FAILED",
            "output": { "reason": "bad input" },
            "error": "worker crashed"
        }))
        .unwrap();
        assert_eq!(status.failure_details(), json!({ "reason": "bad input" }));

        let status: StatusResponse = serde_json::from_value(json!({
            "status": "FAILED",
            "error": "worker crashed"
        }))
        .unwrap();
        assert_eq!(status.failure_details(), json!("worker crashed"));
    }
}
