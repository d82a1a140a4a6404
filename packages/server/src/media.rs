use std::sync::Arc;

use common::storage::filesystem::FilesystemMediaStore;
use common::storage::s3::S3MediaStore;
use common::storage::{MediaStore, StorageError, StoredMedia};
use tracing::{info, warn};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;
use crate::utils::upload::StagedFile;

/// Construct the configured media store.
pub async fn build_media_store(config: &StorageConfig) -> Result<Arc<dyn MediaStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let fs = &config.filesystem;
            info!(root = %fs.root.display(), "Using filesystem media store");
            let store = FilesystemMediaStore::new(
                fs.root.clone(),
                fs.public_base_url.clone(),
                config.max_upload_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let options = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.backend = \"s3\" requires a [storage.s3] section".into())
            })?;
            info!(bucket = %options.bucket, region = %options.region, "Using S3 media store");
            Ok(Arc::new(S3MediaStore::new(options, config.max_upload_size)?))
        }
    }
}

/// Which family of media a file part must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    fn top_level(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            MediaKind::Video => "a video",
            MediaKind::Image => "an image",
        }
    }
}

/// Check that `file_name` guesses to a `video/*` or `image/*` type.
pub fn require_media_kind(file_name: &str, kind: MediaKind, field: &str) -> Result<(), AppError> {
    let matches = mime_guess::from_path(file_name)
        .iter()
        .any(|m| m.type_().as_str() == kind.top_level());
    if matches {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be {} file",
            kind.describe()
        )))
    }
}

/// Upload a staged file. A result without a usable URL counts as a failure.
pub async fn upload_media(
    store: &dyn MediaStore,
    file: &StagedFile,
) -> Result<StoredMedia, AppError> {
    let stored = store.upload(file.path(), &file.file_name).await?;
    if stored.url.trim().is_empty() {
        return Err(AppError::Internal(format!(
            "Upload of {} returned no URL",
            file.file_name
        )));
    }
    Ok(stored)
}

/// Best-effort removal used by compensation paths. Failures are logged only.
pub async fn discard_media(store: &dyn MediaStore, url: &str) {
    match store.delete(url).await {
        Ok(true) => info!(url, "Discarded media object"),
        Ok(false) => warn!(url, "Media object to discard was already gone"),
        Err(e) => warn!(url, error = %e, "Failed to discard media object"),
    }
}
