//! Axum HTTP gateway.
//!
//! This crate provides:
//! - Upload endpoints relayed to a direct backend or run through a job queue
//! - Request-scoped temporary upload files
//! - A JSON error envelope for every failure
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::{ApiConfig, DeploymentMode, RelayEndpoint};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, Gateway};
pub use upload::UploadedAsset;
