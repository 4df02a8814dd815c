//! Job-queue pipeline handler: stage, submit, poll, fetch.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::{AppState, Gateway};
use crate::upload::receive_upload;

/// Multipart field carrying the audio file.
const FILE_FIELD: &str = "file";

/// Run one uploaded file through the job queue and return the artifact.
///
/// If the client goes away, the server drops this future; polling stops at
/// its next await and the upload guard still removes the local file.
pub async fn transcribe_via_queue(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let Gateway::Queue {
        storage,
        orchestrator,
    } = &state.gateway
    else {
        return Err(ApiError::internal("job queue is not configured"));
    };
    let multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut upload = receive_upload(multipart, &state.config.upload_dir, FILE_FIELD).await?;
    let asset = upload.require_asset()?;
    metrics::record_upload_bytes(asset.size());

    let staged = storage
        .stage(asset.path(), asset.file_name(), asset.content_type())
        .await?;

    let artifact = orchestrator.run(&staged).await?;

    info!(
        bytes = artifact.len(),
        "Returning artifact for {}",
        asset.file_name()
    );

    Ok((
        [(header::CONTENT_TYPE, state.config.queue_content_type.clone())],
        artifact,
    )
        .into_response())
}
