use std::path::Path;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use serde::Deserialize;
use tokio::fs;

use super::error::StorageError;
use super::duration::video_duration;
use super::traits::{
    MediaStore, StoredMedia, content_type_for, key_from_url, object_key, object_url,
};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Options {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). Enables path-style addressing.
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    /// Base URL objects are publicly reachable under (bucket URL or CDN).
    pub public_base_url: String,
}

/// Media store backed by an S3-compatible bucket.
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    public_base_url: String,
    max_size: u64,
}

impl S3MediaStore {
    pub fn new(options: &S3Options, max_size: u64) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(options.access_key.as_str()),
            Some(options.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let endpoint = options
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", options.region));
        let region = Region::Custom {
            region: options.region.clone(),
            endpoint,
        };

        let mut bucket = Bucket::new(&options.bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if options.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url: options.public_base_url.clone(),
            max_size,
        })
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
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
        let content_type = content_type_for(file_name);
        let mut file = fs::File::open(path).await?;

        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut file, &key, &content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Backend(format!(
                "upload of {key} failed with status {status}"
            )));
        }

        tracing::debug!(key = %key, size, "Stored media object in bucket");

        Ok(StoredMedia {
            url: object_url(&self.public_base_url, &key),
            key,
            size,
            content_type,
            duration,
        })
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let key = key_from_url(&self.public_base_url, url)?;
        let response = self
            .bucket
            .delete_object(&key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match response.status_code() {
            200..=299 => Ok(true),
            404 => Ok(false),
            status => Err(StorageError::Backend(format!(
                "delete of {key} failed with status {status}"
            ))),
        }
    }
}
