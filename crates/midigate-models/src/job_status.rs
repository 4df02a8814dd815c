//! Remote job status as reported by the job-queue API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Job processing status.
///
/// The queue reports statuses as upper-case strings. Anything this gateway
/// does not recognize is kept verbatim in [`JobStatus::Other`] and treated
/// like an in-flight job. A null status reads as [`JobStatus::InProgress`];
/// a non-string one becomes `Other` with its JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "Option<Value>", into = "String")]
pub enum JobStatus {
    /// Job is waiting for a worker
    Queued,
    /// Job is being processed (assumed before the first poll)
    #[default]
    InProgress,
    /// Job finished and carries an output payload
    Completed,
    /// Job failed remotely
    Failed,
    /// Any status string not listed above
    Other(String),
}

impl JobStatus {
    /// Parse a status string reported by the queue.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IN_QUEUE" | "QUEUED" => JobStatus::Queued,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Other(raw.to_string()),
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "IN_QUEUE",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(raw) => raw,
        }
    }

}

impl From<Option<Value>> for JobStatus {
    fn from(raw: Option<Value>) -> Self {
        match raw {
            None | Some(Value::Null) => JobStatus::InProgress,
            Some(Value::String(s)) => JobStatus::parse(&s),
            Some(other) => JobStatus::Other(other.to_string()),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
