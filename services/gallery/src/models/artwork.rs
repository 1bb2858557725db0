//! Artwork models for the gallery service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, deserialize_collection_ref};

/// Kind of media an artwork points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    /// Detect the media type from a MIME type, `None` for non-media files
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(MediaType::Image)
        } else if mime.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    /// Guess the media type from a URL's file extension
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        let (_, ext) = file.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" | "avif" | "tif" | "tiff" => {
                Some(MediaType::Image)
            }
            "mp4" | "webm" | "mov" | "m4v" | "ogv" | "mkv" | "avi" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// Measurement unit of artwork dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    #[default]
    Inches,
    Cm,
    Pixels,
}

/// Physical or pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub depth: f64,
    #[serde(default)]
    pub unit: DimensionUnit,
}

/// Artwork record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: i64,
    pub title: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub media_type: MediaType,
    pub date: NaiveDate,
    pub dimensions: Dimensions,
    pub owner: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_collection_ref")]
    pub collection_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artwork {
    /// Notes as text, empty when absent
    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or_default()
    }

    /// Replace every mutable field with the draft's values
    pub fn apply(&mut self, draft: ArtworkDraft, now: DateTime<Utc>) {
        self.thumbnail_url = draft.thumbnail_or_media();
        self.title = draft.title;
        self.media_url = draft.media_url;
        self.media_type = draft.media_type;
        self.date = draft.date;
        self.dimensions = draft.dimensions;
        self.owner = draft.owner;
        self.notes = draft.notes;
        self.collection_id = draft.collection_id;
        self.updated_at = now;
    }
}

/// Mutable artwork fields, as submitted by the create and edit forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkDraft {
    pub title: String,
    pub media_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub media_type: MediaType,
    pub date: NaiveDate,
    pub dimensions: Dimensions,
    pub owner: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_collection_ref")]
    pub collection_id: Option<i64>,
}

impl ArtworkDraft {
    /// Thumbnail URL, falling back to the media URL when unset or blank
    pub fn thumbnail_or_media(&self) -> String {
        match self.thumbnail_url.as_deref().map(str::trim) {
            Some(thumb) if !thumb.is_empty() => thumb.to_string(),
            _ => self.media_url.clone(),
        }
    }

    /// Build the stored record for a freshly assigned id
    pub fn into_artwork(self, id: i64, now: DateTime<Utc>) -> Artwork {
        Artwork {
            id,
            thumbnail_url: self.thumbnail_or_media(),
            title: self.title,
            media_url: self.media_url,
            media_type: self.media_type,
            date: self.date,
            dimensions: self.dimensions,
            owner: self.owner,
            notes: self.notes,
            collection_id: self.collection_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Artwork> for ArtworkDraft {
    fn from(artwork: &Artwork) -> Self {
        Self {
            title: artwork.title.clone(),
            media_url: artwork.media_url.clone(),
            thumbnail_url: Some(artwork.thumbnail_url.clone()),
            media_type: artwork.media_type,
            date: artwork.date,
            dimensions: artwork.dimensions,
            owner: artwork.owner.clone(),
            notes: artwork.notes.clone(),
            collection_id: artwork.collection_id,
        }
    }
}

/// Artwork annotated with its resolved collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtworkView {
    #[serde(flatten)]
    pub artwork: Artwork,
    pub collection: Option<Collection>,
}

impl ArtworkView {
    /// Resolve the artwork's collection against a list of collections
    pub fn resolve(artwork: Artwork, collections: &[Collection]) -> Self {
        let collection = artwork
            .collection_id
            .and_then(|id| collections.iter().find(|c| c.id == id).cloned());
        Self {
            artwork,
            collection,
        }
    }
}
