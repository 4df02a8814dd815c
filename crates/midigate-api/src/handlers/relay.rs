//! Direct relay handler shared by every configured endpoint.

use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::info;

use midigate_backend::{BackendError, RelayRequest};

use crate::config::RelayEndpoint;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::{AppState, Gateway};
use crate::upload::receive_upload;

/// Forward an uploaded file to the endpoint's backend path and hand the
/// backend's answer back with the endpoint's content type.
pub async fn relay_upload(
    state: AppState,
    endpoint: RelayEndpoint,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let Gateway::Direct(backend) = &state.gateway else {
        return Err(ApiError::internal("direct relay is not configured"));
    };
    let multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut upload =
        receive_upload(multipart, &state.config.upload_dir, &endpoint.file_field).await?;
    let asset = upload.require_asset()?;
    metrics::record_upload_bytes(asset.size());

    let fields = endpoint
        .extra_field
        .iter()
        .map(|(name, default)| {
            let value = upload.fields.remove(name).unwrap_or_else(|| default.clone());
            (name.clone(), value)
        })
        .collect();

    let request = RelayRequest {
        endpoint_path: endpoint.backend_path.clone(),
        file_path: asset.path().to_path_buf(),
        file_field: endpoint.file_field.clone(),
        file_name: asset.file_name().to_string(),
        content_type: asset.content_type().map(|s| s.to_string()),
        fields,
        timeout: endpoint.timeout,
    };

    let start = Instant::now();
    let result = backend.relay(&request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            let upstream = match &e {
                BackendError::Upstream { status, .. } => *status,
                _ => 0,
            };
            metrics::record_relay(endpoint.name(), upstream, elapsed);
            return Err(e.into());
        }
    };
    metrics::record_relay(endpoint.name(), response.status, elapsed);

    info!(
        endpoint = endpoint.name(),
        bytes = response.body.len(),
        "Relayed {}",
        asset.file_name()
    );

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    Ok((
        status,
        [(header::CONTENT_TYPE, endpoint.content_type.clone())],
        response.body,
    )
        .into_response())
}
