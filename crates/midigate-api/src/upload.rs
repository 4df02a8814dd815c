//! Request-scoped temporary uploads.
//!
//! The file field of an inbound multipart body is streamed to a uniquely
//! named file. [`UploadedAsset`] owns that file and deletes it when dropped,
//! so every exit path of a handler cleans up, including errors and
//! cancelled requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Ephemeral local copy of an uploaded file.
#[derive(Debug)]
pub struct UploadedAsset {
    path: Option<TempPath>,
    location: PathBuf,
    file_name: String,
    content_type: Option<String>,
    size: u64,
}

impl UploadedAsset {
    pub fn path(&self) -> &Path {
        &self.location
    }

    /// Original file name as sent by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for UploadedAsset {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            match path.close() {
                Ok(()) => debug!("Removed temporary upload {}", self.location.display()),
                Err(e) => warn!(
                    "Failed to remove temporary upload {}: {}",
                    self.location.display(),
                    e
                ),
            }
        }
    }
}

/// Everything read from an inbound multipart body.
#[derive(Debug, Default)]
pub struct ReceivedUpload {
    pub asset: Option<UploadedAsset>,
    pub fields: HashMap<String, String>,
}

impl ReceivedUpload {
    /// Take the uploaded file, failing with 400 when none was attached.
    pub fn require_asset(&mut self) -> ApiResult<UploadedAsset> {
        self.asset.take().ok_or(ApiError::MissingFile)
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::bad_request(e.body_text())
    }
}

/// Read a multipart body: the field named `file_field` goes to disk under
/// `dir`, every other field is kept as text.
pub async fn receive_upload(
    mut multipart: Multipart,
    dir: &Path,
    file_field: &str,
) -> ApiResult<ReceivedUpload> {
    let mut upload = ReceivedUpload::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name != file_field || upload.asset.is_some() {
            let text = field.text().await.map_err(multipart_error)?;
            upload.fields.insert(name, text);
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let (std_file, temp_path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)?
            .into_parts();
        let location = temp_path.to_path_buf();

        // Owned from here on, so a failed write still removes the file.
        let mut asset = UploadedAsset {
            path: Some(temp_path),
            location,
            file_name,
            content_type,
            size: 0,
        };

        let mut file = tokio::fs::File::from_std(std_file);
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.write_all(&chunk).await?;
            asset.size += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(
            "Received {} ({} bytes) at {}",
            asset.file_name,
            asset.size,
            asset.location.display()
        );
        upload.asset = Some(asset);
    }

    Ok(upload)
}
