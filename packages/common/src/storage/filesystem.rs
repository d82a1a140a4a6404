use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::duration::video_duration;
use super::traits::{
    MediaStore, StoredMedia, content_type_for, key_from_url, object_key, object_url,
};

/// Filesystem-backed media store.
///
/// Objects live flat under `root` as `{uuidv7}.{ext}` and are published under
/// `public_base_url`, which is expected to serve `root` read-only.
pub struct FilesystemMediaStore {
    root: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create a new filesystem media store, creating `root` if needed.
    pub async fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into(),
            max_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<StoredMedia, StorageError> {
        let size = fs::metadata(path).await?.len();
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let duration = video_duration(path).await?;
        let key = object_key(file_name);
        let temp_path = self.temp_path();

        if let Err(e) = fs::copy(path, &temp_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, self.object_path(&key)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, size, "Stored media object");

        Ok(StoredMedia {
            url: object_url(&self.public_base_url, &key),
            key,
            size,
            content_type: content_type_for(file_name),
            duration,
        })
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let key = key_from_url(&self.public_base_url, url)?;
        match fs::remove_file(self.object_path(&key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
