mod duration;
mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use duration::video_duration;
pub use error::StorageError;
pub use traits::{MediaStore, StoredMedia};
