//! Uploaded photo storage under the media root.
//!
//! Stored paths are relative to the media root and always use `/`, so they
//! double as the tail of the public URL under [`MEDIA_URL_PREFIX`].

use std::io::ErrorKind;
use std::path::Path;

use cards_core::person::PHOTO_UPLOAD_DIR;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// URL prefix the media root is served under.
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Write a photo under `<media_root>/persons/` with a generated unique name.
///
/// Returns the stored path relative to `media_root`.
pub async fn store_photo(media_root: &Path, bytes: &[u8], extension: &str) -> AppResult<String> {
    let dir = media_root.join(PHOTO_UPLOAD_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
    write_new(&dir.join(&file_name), bytes)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let relative = format!("{PHOTO_UPLOAD_DIR}/{file_name}");
    tracing::debug!(path = %relative, size = bytes.len(), "Stored photo");
    Ok(relative)
}

/// Write `bytes` to `path`, removing whatever was written if the write fails.
async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let Err(e) = tokio::fs::write(path, bytes).await else {
        return Ok(());
    };
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial photo"),
        Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => {}
        Err(cleanup) => {
            tracing::warn!(path = %path.display(), error = %cleanup, "Failed to remove partial photo")
        }
    }
    Err(e)
}

/// Remove a stored photo after the record it was written for failed to save.
///
/// Failures are logged and otherwise ignored.
pub async fn discard(media_root: &Path, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(media_root.join(relative)).await {
        tracing::warn!(path = %relative, error = %e, "Failed to discard photo");
    }
}

/// Public URL of a stored photo.
pub fn photo_url(relative: &str) -> String {
    format!("{MEDIA_URL_PREFIX}/{relative}")
}
