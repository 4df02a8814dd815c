//! Backend request/response types.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file plus string form fields to forward to one backend path.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// Path appended to the backend base URL
    pub endpoint_path: String,
    /// Local file to send
    pub file_path: PathBuf,
    /// Multipart field name of the file
    pub file_field: String,
    /// Original file name reported to the backend
    pub file_name: String,
    /// Content type of the file, if known
    pub content_type: Option<String>,
    /// Extra string-valued form fields
    pub fields: Vec<(String, String)>,
    /// Ceiling for the whole exchange
    pub timeout: Duration,
}

/// Backend answer, passed through verbatim.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Result of a backend liveness check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    /// Path that answered
    pub path: String,
    /// Status code it answered with
    pub status: u16,
    /// Whether the primary path failed and the fallback answered
    pub fallback: bool,
}
