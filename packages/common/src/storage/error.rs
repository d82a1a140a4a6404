use thiserror::Error;

/// Errors that can occur while talking to the media store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The URL does not point into this store.
    #[error("invalid media URL: {0}")]
    InvalidUrl(String),

    /// The object exceeds the configured size limit.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    /// The remote object store rejected or failed the request.
    #[error("object store error: {0}")]
    Backend(String),
}
