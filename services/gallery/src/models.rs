//! Catalog models for request and response payloads

pub mod artwork;
pub mod collection;

pub use artwork::{Artwork, ArtworkDraft, ArtworkView, DimensionUnit, Dimensions, MediaType};
pub use collection::{Collection, CollectionDetail, CollectionDraft, DEFAULT_COLLECTION_COLOR};

use serde::{Deserialize, Deserializer, de};

/// Accept a collection reference as an integer, a numeric string, `""` or `null`
///
/// Form selects submit ids as strings while stored records carry integers;
/// both must resolve to the same reference.
pub fn deserialize_collection_ref<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(id)) => Ok(Some(id)),
        Some(Raw::Text(text)) => parse_collection_ref(&text).map_err(de::Error::custom),
    }
}

/// Parse a collection reference from text; blank means "no collection"
pub fn parse_collection_ref(text: &str) -> Result<Option<i64>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| format!("invalid collection id: {}", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_collection_ref")]
        collection_id: Option<i64>,
    }

    fn parse(json: &str) -> Result<Option<i64>, serde_json::Error> {
        serde_json::from_str::<Holder>(json).map(|h| h.collection_id)
    }

    #[test]
    fn collection_ref_accepts_string_and_integer_forms() {
        assert_eq!(parse(r#"{"collection_id": 3}"#).unwrap(), Some(3));
        assert_eq!(parse(r#"{"collection_id": "3"}"#).unwrap(), Some(3));
        assert_eq!(parse(r#"{"collection_id": " 12 "}"#).unwrap(), Some(12));
    }

    #[test]
    fn collection_ref_blank_or_missing_is_none() {
        assert_eq!(parse(r#"{"collection_id": ""}"#).unwrap(), None);
        assert_eq!(parse(r#"{"collection_id": null}"#).unwrap(), None);
        assert_eq!(parse(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn collection_ref_rejects_garbage() {
        assert!(parse(r#"{"collection_id": "abc"}"#).is_err());
    }
}
