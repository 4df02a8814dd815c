//! Client for the directly addressable compute backend.
//!
//! Uploaded files are forwarded as multipart bodies to fixed backend paths
//! and the backend's response is handed back unchanged. Liveness checks
//! fall back to a secondary health path.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendClient, BackendConfig};
pub use error::{BackendError, BackendResult};
pub use types::{PingResponse, RelayRequest, RelayResponse};
