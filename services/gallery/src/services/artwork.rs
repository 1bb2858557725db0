//! Artwork service

use std::sync::Arc;

use chrono::Utc;
use common::error::StoreResult;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{Rollback, Undo, adjust_artwork_count};
use crate::{
    error::{CatalogError, CatalogResult},
    filter::{ArtworkFilters, filter_artworks},
    models::{Artwork, ArtworkDraft, ArtworkView},
    repositories::CatalogBackend,
    upload::BulkItem,
};

/// Progress of a bulk upload after one item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub current_file: String,
    pub error: Option<String>,
}

/// An item that could not be stored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub index: usize,
    pub title: String,
    pub error: String,
}

/// Outcome of a bulk upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkUploadReport {
    pub successful: Vec<Artwork>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Clone)]
pub struct ArtworkService {
    backend: Arc<dyn CatalogBackend>,
    write_lock: Arc<Mutex<()>>,
}

impl ArtworkService {
    pub fn new(backend: Arc<dyn CatalogBackend>, write_lock: Arc<Mutex<()>>) -> Self {
        Self {
            backend,
            write_lock,
        }
    }

    /// All artworks with their collections, failing if either read fails
    pub async fn try_list(&self) -> StoreResult<Vec<ArtworkView>> {
        let (artworks, collections) = tokio::join!(
            self.backend.list_artworks(),
            self.backend.list_collections()
        );
        let collections = collections?;
        Ok(artworks?
            .into_iter()
            .map(|a| ArtworkView::resolve(a, &collections))
            .collect())
    }

    /// All artworks with their collections; empty when the store fails
    pub async fn list(&self) -> Vec<ArtworkView> {
        self.try_list().await.unwrap_or_else(|e| {
            warn!("Failed to list artworks: {}", e.describe());
            Vec::new()
        })
    }

    /// One artwork with its collection; `None` when absent or the store fails
    pub async fn get(&self, id: i64) -> Option<ArtworkView> {
        let artwork = match self.backend.get_artwork(id).await {
            Ok(artwork) => artwork?,
            Err(e) => {
                warn!("Failed to get artwork {}: {}", id, e.describe());
                return None;
            }
        };
        let collection = match artwork.collection_id {
            Some(cid) => self.backend.get_collection(cid).await.unwrap_or_else(|e| {
                warn!("Failed to resolve collection {}: {}", cid, e.describe());
                None
            }),
            None => None,
        };
        Some(ArtworkView {
            artwork,
            collection,
        })
    }

    pub async fn list_by_collection(&self, collection_id: i64) -> Vec<ArtworkView> {
        let filters = ArtworkFilters {
            collection_id: Some(collection_id),
            ..Default::default()
        };
        self.search("", &filters).await
    }

    pub async fn search(&self, query: &str, filters: &ArtworkFilters) -> Vec<ArtworkView> {
        filter_artworks(&self.list().await, query, filters)
    }

    async fn ensure_collection(&self, collection_id: Option<i64>) -> CatalogResult<()> {
        if let Some(id) = collection_id
            && self.backend.get_collection(id).await?.is_none()
        {
            return Err(CatalogError::collection_not_found(id));
        }
        Ok(())
    }

    /// Store a new artwork and count it in its collection
    pub async fn create(&self, draft: ArtworkDraft) -> CatalogResult<Artwork> {
        let _guard = self.write_lock.lock().await;
        self.ensure_collection(draft.collection_id).await?;
        let artwork = self.backend.insert_artwork(draft, Utc::now()).await?;

        let mut undo = Rollback::default();
        undo.push(Undo::DeleteArtwork(artwork.id));
        if let Some(cid) = artwork.collection_id
            && let Err(err) = adjust_artwork_count(self.backend.as_ref(), &mut undo, cid, 1).await
        {
            undo.run(self.backend.as_ref()).await;
            return Err(err.into());
        }
        info!("Created artwork {} ({})", artwork.id, artwork.title);
        Ok(artwork)
    }

    /// Replace every mutable field of an artwork
    ///
    /// Moving the artwork to another collection moves one count from the old
    /// collection to the new one.
    pub async fn update(&self, id: i64, draft: ArtworkDraft) -> CatalogResult<Artwork> {
        let _guard = self.write_lock.lock().await;
        let mut artwork = self
            .backend
            .get_artwork(id)
            .await?
            .ok_or_else(|| CatalogError::artwork_not_found(id))?;
        self.ensure_collection(draft.collection_id).await?;

        let original = artwork.clone();
        artwork.apply(draft, Utc::now());
        let saved = self
            .backend
            .save_artwork(&artwork)
            .await?
            .ok_or_else(|| CatalogError::artwork_not_found(id))?;

        if original.collection_id != saved.collection_id {
            let mut undo = Rollback::default();
            undo.push(Undo::SaveArtwork(original.clone()));
            if let Err(err) = self
                .move_count(&mut undo, original.collection_id, saved.collection_id)
                .await
            {
                undo.run(self.backend.as_ref()).await;
                return Err(err.into());
            }
        }
        info!("Updated artwork {}", id);
        Ok(saved)
    }

    async fn move_count(
        &self,
        undo: &mut Rollback,
        from: Option<i64>,
        to: Option<i64>,
    ) -> StoreResult<()> {
        if let Some(old) = from {
            adjust_artwork_count(self.backend.as_ref(), undo, old, -1).await?;
        }
        if let Some(new) = to {
            adjust_artwork_count(self.backend.as_ref(), undo, new, 1).await?;
        }
        Ok(())
    }

    /// Remove an artwork and uncount it from its collection
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        let artwork = self
            .backend
            .get_artwork(id)
            .await?
            .ok_or_else(|| CatalogError::artwork_not_found(id))?;
        if !self.backend.delete_artwork(id).await? {
            return Err(CatalogError::artwork_not_found(id));
        }

        let mut undo = Rollback::default();
        undo.push(Undo::RestoreArtwork(artwork.clone()));
        if let Some(cid) = artwork.collection_id
            && let Err(err) = adjust_artwork_count(self.backend.as_ref(), &mut undo, cid, -1).await
        {
            undo.run(self.backend.as_ref()).await;
            return Err(err.into());
        }
        info!("Deleted artwork {}", id);
        Ok(())
    }

    /// Create each item in order, reporting progress after every one
    ///
    /// A failed item is recorded and the batch carries on.
    pub async fn bulk_create<F>(&self, items: Vec<BulkItem>, mut progress: F) -> BulkUploadReport
    where
        F: FnMut(BulkProgress),
    {
        let total = items.len();
        let mut report = BulkUploadReport::default();

        for (index, item) in items.into_iter().enumerate() {
            let title = item
                .draft
                .as_ref()
                .map(|d| d.title.clone())
                .unwrap_or_else(|_| item.file_name.clone());
            let outcome = match item.draft {
                Ok(draft) => self.create(draft).await.map_err(|e| e.to_string()),
                Err(message) => Err(message),
            };
            let error = match outcome {
                Ok(artwork) => {
                    report.successful.push(artwork);
                    None
                }
                Err(message) => {
                    warn!("Bulk item {} ({}) failed: {}", index, item.file_name, message);
                    report.failed.push(BulkFailure {
                        index,
                        title,
                        error: message.clone(),
                    });
                    Some(message)
                }
            };

            let completed = index + 1;
            progress(BulkProgress {
                completed,
                total,
                percentage: ((completed * 100) / total.max(1)) as u8,
                current_file: item.file_name,
                error,
            });
        }

        info!(
            "Bulk upload finished: {} stored, {} failed",
            report.successful.len(),
            report.failed.len()
        );
        report
    }
}
