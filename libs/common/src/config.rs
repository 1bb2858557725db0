//! Configuration module shared by the Artfolio services
//!
//! Values are layered: built-in defaults, then an optional
//! `config/artfolio.toml`, then environment variables prefixed with
//! `ARTFOLIO` (e.g. `ARTFOLIO__BACKEND__PROJECT_ID`).

use std::path::PathBuf;
use std::time::Duration;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Secret used when none is configured; only suitable for local development
pub const DEV_JWT_SECRET: &str = "artfolio-dev-secret";

/// Which record store the services talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Remote when credentials are present, mock otherwise
    Auto,
    /// Seeded in-memory store
    Mock,
    /// Hosted record API
    Remote,
}

/// What happens to artworks when their collection is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionDeletePolicy {
    /// Refuse while any artwork still references the collection
    #[default]
    Block,
    /// Clear the collection reference on affected artworks
    Detach,
    /// Delete affected artworks together with the collection
    Cascade,
}

/// Remote record API settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub api_url: String,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout_seconds: u64,
}

impl BackendConfig {
    /// Both credentials needed by the remote client are set and non-empty
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.project_id) && present(&self.public_key)
    }

    /// Resolve `Auto` into a concrete mode
    ///
    /// Fails when `Remote` is requested explicitly but credentials are missing.
    pub fn effective_mode(&self) -> Result<BackendMode, ConfigError> {
        match self.mode {
            BackendMode::Auto if self.has_credentials() => Ok(BackendMode::Remote),
            BackendMode::Auto => Ok(BackendMode::Mock),
            BackendMode::Remote if !self.has_credentials() => Err(ConfigError::Message(
                "backend.mode is remote but project_id/public_key are not set".to_string(),
            )),
            mode => Ok(mode),
        }
    }
}

/// Authentication service settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub bind: String,
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
}

/// Gallery service settings
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    pub bind: String,
    pub collection_delete_policy: CollectionDeletePolicy,
    pub media_base_url: String,
    pub search_debounce_ms: u64,
}

impl GalleryConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Client-side session persistence
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub token_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub gallery: GalleryConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::with_defaults()?
            // Load from config/artfolio.toml
            .add_source(File::with_name("config/artfolio").required(false))
            // Override from environment (e.g., ARTFOLIO__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("ARTFOLIO").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("backend.mode", "auto")?
            .set_default("backend.api_url", "http://localhost:8080")?
            .set_default("backend.timeout_seconds", 10)?
            .set_default("auth.bind", "0.0.0.0:3000")?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_ttl_seconds", 86_400)?
            .set_default("gallery.bind", "0.0.0.0:3001")?
            .set_default("gallery.collection_delete_policy", "block")?
            .set_default("gallery.media_base_url", "/media")?
            .set_default("gallery.search_debounce_ms", 300)?
            .set_default("session.token_path", ".artfolio/session.json")
    }

    /// Whether the development signing secret is still in use
    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }
}
