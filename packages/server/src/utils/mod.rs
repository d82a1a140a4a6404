pub mod hash;
pub mod id;
pub mod jwt;
pub mod listing;
pub mod owner;
pub mod upload;
