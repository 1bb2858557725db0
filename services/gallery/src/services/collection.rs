//! Collection service

use std::sync::Arc;

use chrono::Utc;
use common::{config::CollectionDeletePolicy, error::StoreResult};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{Rollback, Undo};
use crate::{
    error::{CatalogError, CatalogResult},
    models::{Artwork, ArtworkView, Collection, CollectionDetail, CollectionDraft},
    repositories::CatalogBackend,
};

#[derive(Clone)]
pub struct CollectionService {
    backend: Arc<dyn CatalogBackend>,
    write_lock: Arc<Mutex<()>>,
    delete_policy: CollectionDeletePolicy,
}

impl CollectionService {
    pub fn new(
        backend: Arc<dyn CatalogBackend>,
        write_lock: Arc<Mutex<()>>,
        delete_policy: CollectionDeletePolicy,
    ) -> Self {
        Self {
            backend,
            write_lock,
            delete_policy,
        }
    }

    pub async fn try_list(&self) -> StoreResult<Vec<Collection>> {
        self.backend.list_collections().await
    }

    /// All collections; empty when the store fails
    pub async fn list(&self) -> Vec<Collection> {
        self.try_list().await.unwrap_or_else(|e| {
            warn!("Failed to list collections: {}", e.describe());
            Vec::new()
        })
    }

    pub async fn get(&self, id: i64) -> Option<Collection> {
        self.backend.get_collection(id).await.unwrap_or_else(|e| {
            warn!("Failed to get collection {}: {}", id, e.describe());
            None
        })
    }

    /// Store a new collection; its artwork count always starts at zero
    pub async fn create(&self, draft: CollectionDraft) -> CatalogResult<Collection> {
        let _guard = self.write_lock.lock().await;
        let collection = self.backend.insert_collection(draft, Utc::now()).await?;
        info!("Created collection {} ({})", collection.id, collection.name);
        Ok(collection)
    }

    /// Replace name, description and color
    pub async fn update(&self, id: i64, draft: CollectionDraft) -> CatalogResult<Collection> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self
            .backend
            .get_collection(id)
            .await?
            .ok_or_else(|| CatalogError::collection_not_found(id))?;
        collection.apply(draft);
        let saved = self
            .backend
            .save_collection(&collection)
            .await?
            .ok_or_else(|| CatalogError::collection_not_found(id))?;
        info!("Updated collection {}", id);
        Ok(saved)
    }

    /// Delete a collection according to the configured policy
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        let collection = self
            .backend
            .get_collection(id)
            .await?
            .ok_or_else(|| CatalogError::collection_not_found(id))?;

        let members: Vec<_> = self
            .backend
            .list_artworks()
            .await?
            .into_iter()
            .filter(|a| a.collection_id == Some(id))
            .collect();

        if !members.is_empty() && self.delete_policy == CollectionDeletePolicy::Block {
            return Err(CatalogError::Conflict(format!(
                "Collection \"{}\" still contains {} artwork(s)",
                collection.name,
                members.len()
            )));
        }

        let mut undo = Rollback::default();
        if let Err(err) = self.remove(id, members, &mut undo).await {
            undo.run(self.backend.as_ref()).await;
            return Err(err);
        }
        info!("Deleted collection {}", id);
        Ok(())
    }

    /// Release or drop the members, then the collection row itself
    async fn remove(
        &self,
        id: i64,
        members: Vec<Artwork>,
        undo: &mut Rollback,
    ) -> CatalogResult<()> {
        match self.delete_policy {
            CollectionDeletePolicy::Block => {}
            CollectionDeletePolicy::Detach => {
                let now = Utc::now();
                for original in members {
                    let mut artwork = original.clone();
                    artwork.collection_id = None;
                    artwork.updated_at = now;
                    if self.backend.save_artwork(&artwork).await?.is_some() {
                        undo.push(Undo::SaveArtwork(original));
                    }
                }
                info!("Detached artworks from collection {}", id);
            }
            CollectionDeletePolicy::Cascade => {
                let total = members.len();
                for artwork in members {
                    if self.backend.delete_artwork(artwork.id).await? {
                        undo.push(Undo::RestoreArtwork(artwork));
                    }
                }
                info!("Deleted {} artwork(s) with collection {}", total, id);
            }
        }

        if !self.backend.delete_collection(id).await? {
            return Err(CatalogError::collection_not_found(id));
        }
        Ok(())
    }

    /// A collection and its member artworks, for the detail page
    pub async fn with_artworks(&self, id: i64) -> Option<CollectionDetail> {
        let collection = self.get(id).await?;
        let artworks = self
            .backend
            .list_artworks()
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to list artworks of collection {}: {}", id, e.describe());
                Vec::new()
            })
            .into_iter()
            .filter(|a| a.collection_id == Some(id))
            .map(|a| ArtworkView {
                artwork: a,
                collection: Some(collection.clone()),
            })
            .collect();
        Some(CollectionDetail {
            collection,
            artworks,
        })
    }
}
