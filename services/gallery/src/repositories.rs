//! Storage backends for artworks and collections
//!
//! A backend only knows how to read and write rows. Bookkeeping such as the
//! cached artwork count lives in the services, so both backends share one
//! implementation of it.

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

use crate::models::{Artwork, ArtworkDraft, Collection, CollectionDraft};

pub mod memory;
pub mod remote;

pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

/// Row-level operations over the artwork and collection tables
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn list_artworks(&self) -> StoreResult<Vec<Artwork>>;

    async fn get_artwork(&self, id: i64) -> StoreResult<Option<Artwork>>;

    /// Store a new artwork under a fresh id
    async fn insert_artwork(&self, draft: ArtworkDraft, now: DateTime<Utc>)
    -> StoreResult<Artwork>;

    /// Overwrite an existing artwork; `None` when no row has its id
    async fn save_artwork(&self, artwork: &Artwork) -> StoreResult<Option<Artwork>>;

    /// Remove an artwork; `false` when no row has the id
    async fn delete_artwork(&self, id: i64) -> StoreResult<bool>;

    /// Put a removed artwork back under its old id
    async fn restore_artwork(&self, artwork: &Artwork) -> StoreResult<Artwork>;

    async fn list_collections(&self) -> StoreResult<Vec<Collection>>;

    async fn get_collection(&self, id: i64) -> StoreResult<Option<Collection>>;

    /// Store a new collection under a fresh id, with an artwork count of zero
    async fn insert_collection(
        &self,
        draft: CollectionDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Collection>;

    /// Overwrite an existing collection; `None` when no row has its id
    async fn save_collection(&self, collection: &Collection) -> StoreResult<Option<Collection>>;

    /// Remove a collection; `false` when no row has the id
    async fn delete_collection(&self, id: i64) -> StoreResult<bool>;
}

/// Pick the backend once at startup
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn CatalogBackend>> {
    match config.effective_mode()? {
        BackendMode::Remote => {
            let client = RecordClient::from_config(config)?;
            info!("Using remote record API at {}", config.api_url);
            Ok(Arc::new(RemoteBackend::new(client)))
        }
        _ => {
            info!("Record API not configured, using seeded in-memory store");
            Ok(Arc::new(MemoryBackend::seeded()?))
        }
    }
}
