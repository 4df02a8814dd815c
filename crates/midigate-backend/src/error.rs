//! Backend client error types.

use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to configure backend client: {0}")]
    ConfigError(String),

    #[error("Backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl BackendError {
    /// Backend status code, when the backend answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            BackendError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
