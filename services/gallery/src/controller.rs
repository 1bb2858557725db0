//! Gallery view state
//!
//! Holds what the gallery page shows: the loaded artworks and collections,
//! the search query and filters, and the selected artwork. Local state only
//! changes after the catalog confirms a write.

use tracing::{info, warn};

use crate::{
    error::CatalogResult,
    filter::{ArtworkFilters, FilterField, filter_artworks},
    models::{ArtworkView, Collection},
    services::{ArtworkService, CollectionService},
};

pub struct GalleryController {
    artworks_service: ArtworkService,
    collections_service: CollectionService,
    loading: bool,
    error: Option<String>,
    artworks: Vec<ArtworkView>,
    collections: Vec<Collection>,
    query: String,
    filters: ArtworkFilters,
    selected: Option<i64>,
}

impl GalleryController {
    pub fn new(artworks_service: ArtworkService, collections_service: CollectionService) -> Self {
        Self {
            artworks_service,
            collections_service,
            loading: false,
            error: None,
            artworks: Vec::new(),
            collections: Vec::new(),
            query: String::new(),
            filters: ArtworkFilters::default(),
            selected: None,
        }
    }

    /// Fetch artworks and collections together
    ///
    /// A failed read leaves that list empty and records an error message.
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;

        let (artworks, collections) = tokio::join!(
            self.artworks_service.try_list(),
            self.collections_service.try_list()
        );

        self.artworks = artworks.unwrap_or_else(|e| {
            warn!("Gallery could not load artworks: {}", e.describe());
            self.error = Some("Failed to load artworks".to_string());
            Vec::new()
        });
        self.collections = collections.unwrap_or_else(|e| {
            warn!("Gallery could not load collections: {}", e.describe());
            self.error
                .get_or_insert_with(|| "Failed to load collections".to_string());
            Vec::new()
        });
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn artworks(&self) -> &[ArtworkView] {
        &self.artworks
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &ArtworkFilters {
        &self.filters
    }

    /// Artworks matching the current query and filters
    pub fn visible(&self) -> Vec<ArtworkView> {
        filter_artworks(&self.artworks, &self.query, &self.filters)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_filter(&mut self, field: FilterField, value: &str) -> Result<(), String> {
        self.filters.set(field, value)
    }

    /// Reset the filters and the query
    pub fn clear_filters(&mut self) {
        self.filters = ArtworkFilters::default();
        self.query.clear();
    }

    pub fn select(&mut self, id: Option<i64>) {
        self.selected = id;
    }

    pub fn selected(&self) -> Option<&ArtworkView> {
        let id = self.selected?;
        self.artworks.iter().find(|a| a.artwork.id == id)
    }

    /// Delete the selected artwork
    ///
    /// The local list is only touched once the service reports success.
    pub async fn delete_selected(&mut self) -> CatalogResult<()> {
        let Some(id) = self.selected else {
            return Ok(());
        };
        if let Err(e) = self.artworks_service.delete(id).await {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.artworks.retain(|a| a.artwork.id != id);
        self.selected = None;
        info!("Removed artwork {} from gallery view", id);
        Ok(())
    }
}
