//! Storage backends for user accounts

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    config::{BackendConfig, BackendMode},
    error::StoreResult,
    records::RecordClient,
};
use tracing::info;

use crate::models::{NewUser, User};

pub mod memory;
pub mod remote;

pub use memory::MemoryUserBackend;
pub use remote::RemoteUserBackend;

/// Row-level operations over the user table
#[async_trait]
pub trait UserBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// Look up by an already normalized email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Store a new user under a fresh id
    async fn insert_user(&self, user: NewUser, now: DateTime<Utc>) -> StoreResult<User>;

    /// Overwrite an existing user; `None` when no row has its id
    async fn save_user(&self, user: &User) -> StoreResult<Option<User>>;

    /// Remove a user; `false` when no row has the id
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

/// Pick the backend once at startup
pub fn build_user_backend(config: &BackendConfig) -> Result<Arc<dyn UserBackend>> {
    match config.effective_mode()? {
        BackendMode::Remote => {
            let client = RecordClient::from_config(config)?;
            info!("Using remote record API at {}", config.api_url);
            Ok(Arc::new(RemoteUserBackend::new(client)))
        }
        _ => {
            info!("Record API not configured, using seeded in-memory users");
            Ok(Arc::new(MemoryUserBackend::seeded()?))
        }
    }
}
