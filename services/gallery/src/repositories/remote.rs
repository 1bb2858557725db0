//! Catalog backend over the hosted record API
//!
//! Remote rows are snake_case with the identifier in `Id` and the dimensions
//! flattened into the row. The conversions here are the only place that
//! knows about that shape.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::{
    error::{StoreError, StoreResult},
    records::{FetchQuery, RecordClient},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CatalogBackend;
use crate::models::{
    Artwork, ArtworkDraft, Collection, CollectionDraft, DimensionUnit, Dimensions, MediaType,
    deserialize_collection_ref,
};

pub const ARTWORK_TABLE: &str = "artwork";
pub const COLLECTION_TABLE: &str = "collection";

const ARTWORK_FIELDS: &[&str] = &[
    "Id",
    "title",
    "media_url",
    "thumbnail_url",
    "media_type",
    "date",
    "width",
    "height",
    "depth",
    "unit",
    "owner",
    "notes",
    "collection_id",
    "created_at",
    "updated_at",
];

const COLLECTION_FIELDS: &[&str] = &[
    "Id",
    "name",
    "description",
    "color",
    "artwork_count",
    "created_at",
];

/// Artwork row as the record API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct ArtworkRow {
    #[serde(rename = "Id")]
    pub id: i64,
    pub title: String,
    pub media_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub media_type: MediaType,
    pub date: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub unit: DimensionUnit,
    pub owner: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_collection_ref")]
    pub collection_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Artwork row as sent on create (`id` unset) or update (`id` set)
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkRecord {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub media_type: MediaType,
    pub date: String,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub unit: DimensionUnit,
    pub owner: String,
    pub notes: Option<String>,
    pub collection_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionRow {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub artwork_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionRecord {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub color: String,
    pub artwork_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Keep only the calendar part of a remote date or datetime
fn parse_remote_date(raw: &str) -> StoreResult<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| StoreError::Decode(format!("invalid date {:?}: {}", raw, e)))
}

impl TryFrom<ArtworkRow> for Artwork {
    type Error = StoreError;

    fn try_from(row: ArtworkRow) -> StoreResult<Self> {
        let created_at = row.created_at.unwrap_or_else(Utc::now);
        Ok(Artwork {
            id: row.id,
            thumbnail_url: row
                .thumbnail_url
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| row.media_url.clone()),
            title: row.title,
            media_url: row.media_url,
            media_type: row.media_type,
            date: parse_remote_date(&row.date)?,
            dimensions: Dimensions {
                width: row.width,
                height: row.height,
                depth: row.depth.unwrap_or_default(),
                unit: row.unit,
            },
            owner: row.owner,
            notes: row.notes,
            collection_id: row.collection_id,
            created_at,
            updated_at: row.updated_at.unwrap_or(created_at),
        })
    }
}

impl From<&Artwork> for ArtworkRecord {
    fn from(artwork: &Artwork) -> Self {
        Self {
            id: Some(artwork.id),
            title: artwork.title.clone(),
            media_url: artwork.media_url.clone(),
            thumbnail_url: artwork.thumbnail_url.clone(),
            media_type: artwork.media_type,
            date: artwork.date.format("%Y-%m-%d").to_string(),
            width: artwork.dimensions.width,
            height: artwork.dimensions.height,
            depth: artwork.dimensions.depth,
            unit: artwork.dimensions.unit,
            owner: artwork.owner.clone(),
            notes: artwork.notes.clone(),
            collection_id: artwork.collection_id,
            created_at: artwork.created_at,
            updated_at: artwork.updated_at,
        }
    }
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        let draft = CollectionDraft {
            name: row.name,
            description: row.description.unwrap_or_default(),
            color: row.color,
        };
        let mut collection = draft.into_collection(row.id, row.created_at.unwrap_or_else(Utc::now));
        collection.artwork_count = row.artwork_count.unwrap_or_default();
        collection
    }
}

impl From<&Collection> for CollectionRecord {
    fn from(collection: &Collection) -> Self {
        Self {
            id: Some(collection.id),
            name: collection.name.clone(),
            description: collection.description.clone(),
            color: collection.color.clone(),
            artwork_count: collection.artwork_count,
            created_at: collection.created_at,
        }
    }
}

fn single<T>(rows: Vec<T>, table: &str) -> StoreResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode(format!("{} write returned no record", table)))
}

/// Record API storage backend
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: RecordClient,
}

impl RemoteBackend {
    pub fn new(client: RecordClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list_artworks(&self) -> StoreResult<Vec<Artwork>> {
        let rows: Vec<ArtworkRow> = self
            .client
            .fetch_records(ARTWORK_TABLE, &FetchQuery::fields(ARTWORK_FIELDS))
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Artwork::try_from(row)
                    .inspect_err(|e| warn!("Skipping remote artwork {}: {}", id, e))
                    .ok()
            })
            .collect())
    }

    async fn get_artwork(&self, id: i64) -> StoreResult<Option<Artwork>> {
        let row: Option<ArtworkRow> = self.client.get_record_by_id(ARTWORK_TABLE, id).await?;
        row.map(Artwork::try_from).transpose()
    }

    async fn insert_artwork(
        &self,
        draft: ArtworkDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Artwork> {
        let mut record = ArtworkRecord::from(&draft.into_artwork(0, now));
        record.id = None;
        let rows: Vec<ArtworkRow> = self
            .client
            .create_records(ARTWORK_TABLE, std::slice::from_ref(&record))
            .await?;
        let artwork = Artwork::try_from(single(rows, ARTWORK_TABLE)?)?;
        debug!("Remote artwork {} created", artwork.id);
        Ok(artwork)
    }

    async fn save_artwork(&self, artwork: &Artwork) -> StoreResult<Option<Artwork>> {
        if self.get_artwork(artwork.id).await?.is_none() {
            return Ok(None);
        }
        let rows: Vec<ArtworkRow> = self
            .client
            .update_records(ARTWORK_TABLE, &[ArtworkRecord::from(artwork)])
            .await?;
        Artwork::try_from(single(rows, ARTWORK_TABLE)?).map(Some)
    }

    async fn delete_artwork(&self, id: i64) -> StoreResult<bool> {
        if self.get_artwork(id).await?.is_none() {
            return Ok(false);
        }
        self.client.delete_records(ARTWORK_TABLE, &[id]).await?;
        Ok(true)
    }

    async fn restore_artwork(&self, artwork: &Artwork) -> StoreResult<Artwork> {
        let rows: Vec<ArtworkRow> = self
            .client
            .create_records(ARTWORK_TABLE, &[ArtworkRecord::from(artwork)])
            .await?;
        let restored = Artwork::try_from(single(rows, ARTWORK_TABLE)?)?;
        debug!("Remote artwork {} restored", restored.id);
        Ok(restored)
    }

    async fn list_collections(&self) -> StoreResult<Vec<Collection>> {
        let rows: Vec<CollectionRow> = self
            .client
            .fetch_records(COLLECTION_TABLE, &FetchQuery::fields(COLLECTION_FIELDS))
            .await?;
        Ok(rows.into_iter().map(Collection::from).collect())
    }

    async fn get_collection(&self, id: i64) -> StoreResult<Option<Collection>> {
        let row: Option<CollectionRow> =
            self.client.get_record_by_id(COLLECTION_TABLE, id).await?;
        Ok(row.map(Collection::from))
    }

    async fn insert_collection(
        &self,
        draft: CollectionDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Collection> {
        let mut record = CollectionRecord::from(&draft.into_collection(0, now));
        record.id = None;
        let rows: Vec<CollectionRow> = self
            .client
            .create_records(COLLECTION_TABLE, std::slice::from_ref(&record))
            .await?;
        Ok(Collection::from(single(rows, COLLECTION_TABLE)?))
    }

    async fn save_collection(&self, collection: &Collection) -> StoreResult<Option<Collection>> {
        if self.get_collection(collection.id).await?.is_none() {
            return Ok(None);
        }
        let rows: Vec<CollectionRow> = self
            .client
            .update_records(COLLECTION_TABLE, &[CollectionRecord::from(collection)])
            .await?;
        Ok(Some(Collection::from(single(rows, COLLECTION_TABLE)?)))
    }

    async fn delete_collection(&self, id: i64) -> StoreResult<bool> {
        if self.get_collection(id).await?.is_none() {
            return Ok(false);
        }
        self.client.delete_records(COLLECTION_TABLE, &[id]).await?;
        Ok(true)
    }
}
