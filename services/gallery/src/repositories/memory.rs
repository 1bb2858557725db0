//! In-memory catalog backend
//!
//! Holds the seeded mock data for the lifetime of the process. Nothing is
//! persisted; a restart brings the seed back.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{StoreError, StoreResult};
use tokio::sync::RwLock;

use super::CatalogBackend;
use crate::models::{Artwork, ArtworkDraft, Collection, CollectionDraft};
use crate::seed;

#[derive(Default)]
struct Tables {
    artworks: Vec<Artwork>,
    collections: Vec<Collection>,
}

/// In-memory storage backend
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    simulate_read_error: AtomicBool,
    simulate_write_error: AtomicBool,
}

impl MemoryBackend {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the bundled mock catalog
    pub fn seeded() -> StoreResult<Self> {
        Ok(Self::with_data(
            seed::seed_artworks()?,
            seed::seed_collections()?,
        ))
    }

    pub fn with_data(artworks: Vec<Artwork>, collections: Vec<Collection>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                artworks,
                collections,
            }),
            ..Self::default()
        }
    }

    /// Make every read fail, to exercise degraded read paths
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.store(simulate, Ordering::SeqCst);
    }

    /// Make every write fail, to exercise error propagation
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.simulate_read_error.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Simulated read error".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Simulated write error".to_string()));
        }
        Ok(())
    }
}

/// One past the largest id in use, starting at 1
fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

#[async_trait]
impl CatalogBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_artworks(&self) -> StoreResult<Vec<Artwork>> {
        self.check_read()?;
        Ok(self.tables.read().await.artworks.clone())
    }

    async fn get_artwork(&self, id: i64) -> StoreResult<Option<Artwork>> {
        self.check_read()?;
        let tables = self.tables.read().await;
        Ok(tables.artworks.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_artwork(
        &self,
        draft: ArtworkDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Artwork> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let id = next_id(tables.artworks.iter().map(|a| a.id));
        let artwork = draft.into_artwork(id, now);
        tables.artworks.push(artwork.clone());
        Ok(artwork)
    }

    async fn save_artwork(&self, artwork: &Artwork) -> StoreResult<Option<Artwork>> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        match tables.artworks.iter_mut().find(|a| a.id == artwork.id) {
            Some(slot) => {
                *slot = artwork.clone();
                Ok(Some(artwork.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_artwork(&self, id: i64) -> StoreResult<bool> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let before = tables.artworks.len();
        tables.artworks.retain(|a| a.id != id);
        Ok(tables.artworks.len() < before)
    }

    async fn restore_artwork(&self, artwork: &Artwork) -> StoreResult<Artwork> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        if tables.artworks.iter().any(|a| a.id == artwork.id) {
            return Err(StoreError::Rejected {
                message: format!("Artwork {} already exists", artwork.id),
                fields: Vec::new(),
            });
        }
        tables.artworks.push(artwork.clone());
        tables.artworks.sort_by_key(|a| a.id);
        Ok(artwork.clone())
    }

    async fn list_collections(&self) -> StoreResult<Vec<Collection>> {
        self.check_read()?;
        Ok(self.tables.read().await.collections.clone())
    }

    async fn get_collection(&self, id: i64) -> StoreResult<Option<Collection>> {
        self.check_read()?;
        let tables = self.tables.read().await;
        Ok(tables.collections.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_collection(
        &self,
        draft: CollectionDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Collection> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let id = next_id(tables.collections.iter().map(|c| c.id));
        let collection = draft.into_collection(id, now);
        tables.collections.push(collection.clone());
        Ok(collection)
    }

    async fn save_collection(&self, collection: &Collection) -> StoreResult<Option<Collection>> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        match tables.collections.iter_mut().find(|c| c.id == collection.id) {
            Some(slot) => {
                *slot = collection.clone();
                Ok(Some(collection.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_collection(&self, id: i64) -> StoreResult<bool> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let before = tables.collections.len();
        tables.collections.retain(|c| c.id != id);
        Ok(tables.collections.len() < before)
    }
}
