//! Artwork and collection form validation

use chrono::NaiveDate;
use common::forms::FormErrors;
use serde::{Deserialize, Deserializer};

use crate::models::{
    Artwork, ArtworkDraft, CollectionDraft, DimensionUnit, Dimensions, MediaType,
    parse_collection_ref,
};
use crate::upload::MediaUpload;

/// Accept a form value typed as a number or as text
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => String::new(),
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        Some(Raw::Text(s)) => s,
    })
}

/// Reported when a bare media URL leaves the media type unknown
const MEDIA_TYPE_KEY: &str = "mediaType";

/// Fields of the artwork form, as the user edits them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkField {
    Title,
    Media,
    Date,
    Width,
    Height,
    Depth,
    Owner,
    Notes,
    CollectionId,
}

impl ArtworkField {
    /// Key of the message this field reports under
    pub fn error_key(&self) -> &'static str {
        match self {
            ArtworkField::Title => "title",
            ArtworkField::Media => "media",
            ArtworkField::Date => "date",
            ArtworkField::Width | ArtworkField::Height => "dimensions",
            ArtworkField::Depth => "depth",
            ArtworkField::Owner => "owner",
            ArtworkField::Notes => "notes",
            ArtworkField::CollectionId => "collectionId",
        }
    }
}

/// Raw artwork form values
///
/// Everything is kept as entered; numbers and dates are only parsed on
/// validation. `media` is a newly selected file, `media_url` an existing one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub media: Option<MediaUpload>,
    #[serde(default)]
    pub media_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub width: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub height: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub depth: String,
    #[serde(default)]
    pub unit: DimensionUnit,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub collection_id: String,
}

struct Parsed {
    date: Option<NaiveDate>,
    width: f64,
    height: f64,
    depth: f64,
    media_type: MediaType,
    collection_id: Option<i64>,
}

fn positive(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
}

impl ArtworkForm {
    /// Prefill the edit form from a stored artwork
    pub fn from_artwork(artwork: &Artwork) -> Self {
        Self {
            title: artwork.title.clone(),
            media: None,
            media_url: artwork.media_url.clone(),
            thumbnail_url: artwork.thumbnail_url.clone(),
            media_type: Some(artwork.media_type),
            date: artwork.date.format("%Y-%m-%d").to_string(),
            width: artwork.dimensions.width.to_string(),
            height: artwork.dimensions.height.to_string(),
            depth: artwork.dimensions.depth.to_string(),
            unit: artwork.dimensions.unit,
            owner: artwork.owner.clone(),
            notes: artwork.notes_text().to_string(),
            collection_id: artwork
                .collection_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    /// Change one field and drop its pending message
    pub fn edit(&mut self, field: ArtworkField, value: &str, errors: &mut FormErrors) {
        let value = value.to_string();
        match field {
            ArtworkField::Title => self.title = value,
            ArtworkField::Media => self.media_url = value,
            ArtworkField::Date => self.date = value,
            ArtworkField::Width => self.width = value,
            ArtworkField::Height => self.height = value,
            ArtworkField::Depth => self.depth = value,
            ArtworkField::Owner => self.owner = value,
            ArtworkField::Notes => self.notes = value,
            ArtworkField::CollectionId => self.collection_id = value,
        }
        errors.clear(field.error_key());
        if field == ArtworkField::Media {
            errors.clear(MEDIA_TYPE_KEY);
        }
    }

    /// Attach a newly selected file
    pub fn select_media(&mut self, upload: MediaUpload, errors: &mut FormErrors) {
        self.media = Some(upload);
        errors.clear(ArtworkField::Media.error_key());
        errors.clear(MEDIA_TYPE_KEY);
    }

    /// Every message the current values produce
    pub fn validate(&self) -> FormErrors {
        self.check().0
    }

    fn check(&self) -> (FormErrors, Parsed) {
        let mut errors = FormErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }

        // an upload is typed by its MIME type; a bare URL by the form or its extension
        let mut media_type = MediaType::default();
        match &self.media {
            Some(upload) => match upload.media_type() {
                Some(detected) => media_type = detected,
                None => errors.add(
                    "media",
                    format!("Unsupported media type: {}", upload.content_type),
                ),
            },
            None if self.media_url.trim().is_empty() => {
                errors.add("media", "Media file is required")
            }
            None => match self
                .media_type
                .or_else(|| MediaType::from_path(self.media_url.trim()))
            {
                Some(known) => media_type = known,
                None => errors.add(
                    MEDIA_TYPE_KEY,
                    "Media type is required when it cannot be told from the URL",
                ),
            },
        }

        let date = if self.date.trim().is_empty() {
            errors.add("date", "Date is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.add("date", "Date must be a valid calendar date");
            }
            parsed
        };

        let (width, height) = if self.width.trim().is_empty() || self.height.trim().is_empty() {
            errors.add("dimensions", "Width and height are required");
            (0.0, 0.0)
        } else {
            match (positive(&self.width), positive(&self.height)) {
                (Some(w), Some(h)) => (w, h),
                _ => {
                    errors.add("dimensions", "Width and height must be positive numbers");
                    (0.0, 0.0)
                }
            }
        };

        let depth = if self.depth.trim().is_empty() {
            0.0
        } else {
            match self.depth.trim().parse::<f64>() {
                Ok(d) if d.is_finite() && d >= 0.0 => d,
                _ => {
                    errors.add("depth", "Depth must be a non-negative number");
                    0.0
                }
            }
        };

        if self.owner.trim().is_empty() {
            errors.add("owner", "Owner is required");
        }

        let collection_id = parse_collection_ref(&self.collection_id).unwrap_or_else(|_| {
            errors.add("collectionId", "Invalid collection");
            None
        });

        (
            errors,
            Parsed {
                date,
                width,
                height,
                depth,
                media_type,
                collection_id,
            },
        )
    }

    /// Validate and build the draft to submit
    ///
    /// A selected file wins over an existing media URL and is stored under
    /// `media_base_url`.
    pub fn into_draft(self, media_base_url: &str) -> Result<ArtworkDraft, FormErrors> {
        let (errors, parsed) = self.check();
        errors.into_result()?;
        let Some(date) = parsed.date else {
            let mut errors = FormErrors::new();
            errors.add("date", "Date is required");
            return Err(errors);
        };

        let (media_url, thumbnail_url) = match &self.media {
            Some(upload) => (upload.media_url(media_base_url), None),
            None => (
                self.media_url.trim().to_string(),
                Some(self.thumbnail_url.trim().to_string()).filter(|t| !t.is_empty()),
            ),
        };
        let notes = Some(self.notes.trim().to_string()).filter(|n| !n.is_empty());

        Ok(ArtworkDraft {
            title: self.title.trim().to_string(),
            media_url,
            thumbnail_url,
            media_type: parsed.media_type,
            date,
            dimensions: Dimensions {
                width: parsed.width,
                height: parsed.height,
                depth: parsed.depth,
                unit: self.unit,
            },
            owner: self.owner.trim().to_string(),
            notes,
            collection_id: parsed.collection_id,
        })
    }
}

/// Raw collection form values
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

impl CollectionForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Collection name is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required");
        }
        errors
    }

    pub fn into_draft(self) -> Result<CollectionDraft, FormErrors> {
        self.validate().into_result()?;
        Ok(CollectionDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            color: Some(self.color.trim().to_string()).filter(|c| !c.is_empty()),
        })
    }
}
