//! Collection models for the gallery service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ArtworkView;

/// Color given to collections created without one
pub const DEFAULT_COLLECTION_COLOR: &str = "#6366f1";

/// Collection record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    /// Cached number of artworks referencing this collection
    pub artwork_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Mutable collection fields
///
/// An `artworkCount` sent by a client is ignored; the count is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDraft {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl CollectionDraft {
    pub fn color_or_default(&self) -> String {
        match self.color.as_deref().map(str::trim) {
            Some(color) if !color.is_empty() => color.to_string(),
            _ => DEFAULT_COLLECTION_COLOR.to_string(),
        }
    }

    pub fn into_collection(self, id: i64, now: DateTime<Utc>) -> Collection {
        Collection {
            id,
            color: self.color_or_default(),
            name: self.name,
            description: self.description,
            artwork_count: 0,
            created_at: now,
        }
    }
}

impl Collection {
    /// Replace name, description and color; id, count and creation time stay
    pub fn apply(&mut self, draft: CollectionDraft) {
        self.color = draft.color_or_default();
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// A collection together with its member artworks
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetail {
    pub collection: Collection,
    pub artworks: Vec<ArtworkView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collection_starts_empty_with_default_color() {
        let draft: CollectionDraft = serde_json::from_str(
            r#"{"name": "Sketches", "description": "Pencil work", "artworkCount": 12}"#,
        )
        .unwrap();
        let collection = draft.into_collection(4, Utc::now());
        assert_eq!(collection.artwork_count, 0);
        assert_eq!(collection.color, DEFAULT_COLLECTION_COLOR);
    }

    #[test]
    fn apply_keeps_count_and_creation_time() {
        let created = Utc::now();
        let mut collection = Collection {
            id: 1,
            name: "Old".to_string(),
            description: "Old description".to_string(),
            color: "#000000".to_string(),
            artwork_count: 3,
            created_at: created,
        };
        collection.apply(CollectionDraft {
            name: "New".to_string(),
            description: "New description".to_string(),
            color: Some("#ff0000".to_string()),
        });
        assert_eq!(collection.name, "New");
        assert_eq!(collection.color, "#ff0000");
        assert_eq!(collection.artwork_count, 3);
        assert_eq!(collection.created_at, created);
    }
}
