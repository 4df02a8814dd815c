//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, Gateway};

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub mode: String,
    pub timestamp: String,
}

/// Local liveness only; never touches the backend.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.mode().as_str().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Remote backend liveness.
#[derive(Serialize)]
pub struct PingReport {
    pub status: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    pub fallback: bool,
}

/// Check that the remote backend answers.
pub async fn ping(State(state): State<AppState>) -> ApiResult<Json<PingReport>> {
    let mode = state.mode().as_str().to_string();

    match &state.gateway {
        Gateway::Direct(backend) => {
            let ping = backend
                .ping()
                .await
                .map_err(|e| ApiError::Unavailable(e.to_string()))?;
            Ok(Json(PingReport {
                status: "ok".to_string(),
                mode,
                path: Some(ping.path),
                upstream_status: Some(ping.status),
                fallback: ping.fallback,
            }))
        }
        Gateway::Queue { orchestrator, .. } => {
            if !orchestrator.client().health_check().await? {
                return Err(ApiError::Unavailable(
                    "job queue health check failed".to_string(),
                ));
            }
            Ok(Json(PingReport {
                status: "ok".to_string(),
                mode,
                path: None,
                upstream_status: None,
                fallback: false,
            }))
        }
    }
}
