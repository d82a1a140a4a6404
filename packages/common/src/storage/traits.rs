use std::path::Path;

use async_trait::async_trait;
use uuid::Uuid;

use super::error::StorageError;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    /// Public URL the object can be fetched from.
    pub url: String,
    /// Store-relative object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    pub content_type: String,
    /// Playback length in seconds, when the media header could be read.
    pub duration: Option<f64>,
}

/// Object storage for uploaded media, addressed by URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload the file at `path`. `file_name` is the client-supplied name and
    /// only determines the stored extension and content type.
    async fn upload(&self, path: &Path, file_name: &str) -> Result<StoredMedia, StorageError>;

    /// Delete the object behind `url`.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, url: &str) -> Result<bool, StorageError>;
}

/// Generate a fresh object key, keeping a sanitized extension from `file_name`.
pub(crate) fn object_key(file_name: &str) -> String {
    let id = Uuid::now_v7();
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

pub(crate) fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

pub(crate) fn object_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

/// Recover the object key from a URL previously produced by [`object_url`].
pub(crate) fn key_from_url(base_url: &str, url: &str) -> Result<String, StorageError> {
    let prefix = format!("{}/", base_url.trim_end_matches('/'));
    let key = url
        .strip_prefix(&prefix)
        .ok_or_else(|| StorageError::InvalidUrl(url.to_string()))?;

    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.contains("..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    if !valid {
        return Err(StorageError::InvalidUrl(url.to_string()));
    }

    Ok(key.to_string())
}
