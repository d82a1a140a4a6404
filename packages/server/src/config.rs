use std::path::PathBuf;

use common::storage::s3::S3Options;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// Log every SQL statement at debug level.
    pub log_statements: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued access tokens.
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Filesystem,
    S3,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemStorageConfig {
    /// Directory media objects are written to. Served under `/media`.
    pub root: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Upper bound for a single uploaded file, in bytes.
    pub max_upload_size: u64,
    pub filesystem: FilesystemStorageConfig,
    pub s3: Option<S3Options>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://vidline.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("database.log_statements", false)?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.max_upload_size", 512 * 1024 * 1024)?
            .set_default("storage.filesystem.root", "./data/media")?
            .set_default(
                "storage.filesystem.public_base_url",
                "http://127.0.0.1:3000/media",
            )?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VIDLINE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("VIDLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
