//! Media upload intake
//!
//! Files arrive described by name, MIME type and size. They are turned into
//! artwork drafts here; storing the bytes is the media host's concern.

use chrono::NaiveDate;
use common::forms::FormErrors;
use serde::{Deserialize, Serialize};

use crate::models::{ArtworkDraft, DimensionUnit, Dimensions, MediaType, parse_collection_ref};

/// A file picked for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}

impl MediaUpload {
    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_mime(&self.content_type)
    }

    /// Public URL of the stored file
    pub fn media_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file_name)
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

/// One entry handed to bulk creation
#[derive(Debug, Clone)]
pub struct BulkItem {
    pub file_name: String,
    /// The draft, or why the file could not become one
    pub draft: Result<ArtworkDraft, String>,
}

/// Bulk upload form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadRequest {
    #[serde(default)]
    pub files: Vec<MediaUpload>,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BulkUploadRequest {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.files.is_empty() {
            errors.add("files", "Please select files to upload");
        }
        match parse_collection_ref(&self.collection_id) {
            Ok(Some(_)) => {}
            Ok(None) => errors.add("collectionId", "Collection is required"),
            Err(_) => errors.add("collectionId", "Invalid collection"),
        }
        if self.owner.trim().is_empty() {
            errors.add("owner", "Owner is required");
        }
        errors
    }

    /// Turn every file into a draft dated `today`
    ///
    /// Non-media files become failed items rather than aborting the batch.
    pub fn into_items(self, base_url: &str, today: NaiveDate) -> Result<Vec<BulkItem>, FormErrors> {
        self.validate().into_result()?;
        let collection_id = parse_collection_ref(&self.collection_id).map_err(|message| {
            let mut errors = FormErrors::new();
            errors.add("collectionId", message);
            errors
        })?;
        let owner = self.owner.trim().to_string();
        let shared_notes = self.notes.filter(|n| !n.trim().is_empty());

        let items = self
            .files
            .into_iter()
            .map(|file| {
                let draft = match file.media_type() {
                    Some(media_type) => Ok(ArtworkDraft {
                        title: file.stem().to_string(),
                        media_url: file.media_url(base_url),
                        thumbnail_url: None,
                        media_type,
                        date: today,
                        dimensions: Dimensions {
                            width: 1.0,
                            height: 1.0,
                            depth: 0.0,
                            unit: DimensionUnit::Pixels,
                        },
                        owner: owner.clone(),
                        notes: Some(shared_notes.clone().unwrap_or_else(|| {
                            format!("Uploaded via bulk upload - {}", file.file_name)
                        })),
                        collection_id,
                    }),
                    None => Err(format!("Unsupported media type: {}", file.content_type)),
                };
                BulkItem {
                    file_name: file.file_name,
                    draft,
                }
            })
            .collect();
        Ok(items)
    }
}
