//! Remote job identity and terminal outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque job identifier assigned by the remote queue at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal result of polling a job.
///
/// Polling moves through `POLLING` until one of these states is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The queue reported COMPLETED; carries the output payload.
    Completed { output: Value, attempts: u32 },
    /// The queue reported FAILED; carries the remote failure details verbatim.
    Failed { details: Value, attempts: u32 },
    /// The attempt budget ran out without a terminal status.
    TimedOut { attempts: u32 },
}

impl JobOutcome {
    /// Number of status queries performed before reaching this outcome.
    pub fn attempts(&self) -> u32 {
        match self {
            JobOutcome::Completed { attempts, .. }
            | JobOutcome::Failed { attempts, .. }
            | JobOutcome::TimedOut { attempts } => *attempts,
        }
    }

    /// Short lowercase label, used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Completed { .. } => "completed",
            JobOutcome::Failed { .. } => "failed",
            JobOutcome::TimedOut { .. } => "timed_out",
        }
    }
}
