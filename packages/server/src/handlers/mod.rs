pub mod auth;
pub mod subscription;
pub mod tweet;
pub mod video;
