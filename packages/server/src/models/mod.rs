pub mod auth;
pub mod shared;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;
