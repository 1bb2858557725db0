//! Catalog services
//!
//! The artwork and collection services share one backend and one write lock.
//! Every mutation, including the cached artwork count bookkeeping, runs while
//! holding that lock, so concurrent writes cannot lose count updates or hand
//! out duplicate ids. Reads never take the lock.

use std::sync::Arc;

use common::{config::CollectionDeletePolicy, error::StoreResult};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::models::{Artwork, Collection};
use crate::repositories::CatalogBackend;

pub mod artwork;
pub mod collection;

pub use artwork::{ArtworkService, BulkFailure, BulkProgress, BulkUploadReport};
pub use collection::CollectionService;

/// Both catalog services over one backend
#[derive(Clone)]
pub struct Catalog {
    pub artworks: ArtworkService,
    pub collections: CollectionService,
}

impl Catalog {
    pub fn new(backend: Arc<dyn CatalogBackend>, delete_policy: CollectionDeletePolicy) -> Self {
        let write_lock = Arc::new(Mutex::new(()));
        Self {
            artworks: ArtworkService::new(backend.clone(), write_lock.clone()),
            collections: CollectionService::new(backend, write_lock, delete_policy),
        }
    }
}

/// Move a collection's cached artwork count by `delta`
///
/// A collection that no longer exists is skipped. On success the row as it
/// was before the change is recorded in `undo`. Callers must hold the write
/// lock.
async fn adjust_artwork_count(
    backend: &dyn CatalogBackend,
    undo: &mut Rollback,
    collection_id: i64,
    delta: i64,
) -> StoreResult<()> {
    let Some(mut collection) = backend.get_collection(collection_id).await? else {
        debug!(
            "Collection {} is gone, skipping count adjustment",
            collection_id
        );
        return Ok(());
    };
    let previous = collection.clone();
    let count = (i64::from(collection.artwork_count) + delta).max(0);
    collection.artwork_count = u32::try_from(count).unwrap_or(u32::MAX);
    backend.save_collection(&collection).await?;
    undo.push(Undo::SaveCollection(previous));
    Ok(())
}

/// Inverse of a write that already reached the store
#[derive(Debug, Clone)]
enum Undo {
    /// Remove an artwork that was inserted
    DeleteArtwork(i64),
    /// Put back an artwork that was deleted
    RestoreArtwork(Artwork),
    /// Write back the previous version of an artwork
    SaveArtwork(Artwork),
    /// Write back the previous version of a collection
    SaveCollection(Collection),
}

/// Undo log for one multi-step mutation
///
/// The backends have no transactions, so a mutation records the inverse of
/// every step it completes. When a later step fails the log is replayed in
/// reverse before the error reaches the caller.
#[derive(Debug, Default)]
struct Rollback {
    steps: Vec<Undo>,
}

impl Rollback {
    fn push(&mut self, step: Undo) {
        self.steps.push(step);
    }

    /// Replay the log, newest step first
    ///
    /// A failing inverse is logged and the rest still run.
    async fn run(self, backend: &dyn CatalogBackend) {
        if self.steps.is_empty() {
            return;
        }
        warn!("Rolling back {} completed write(s)", self.steps.len());
        for step in self.steps.into_iter().rev() {
            let outcome = match &step {
                Undo::DeleteArtwork(id) => backend.delete_artwork(*id).await.map(drop),
                Undo::RestoreArtwork(artwork) => backend.restore_artwork(artwork).await.map(drop),
                Undo::SaveArtwork(artwork) => backend.save_artwork(artwork).await.map(drop),
                Undo::SaveCollection(collection) => {
                    backend.save_collection(collection).await.map(drop)
                }
            };
            if let Err(err) = outcome {
                error!("Rollback step {:?} failed: {}", step, err.describe());
            }
        }
    }
}
