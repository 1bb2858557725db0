//! Artwork search and filtering
//!
//! Filtering is a pure pass over a slice: the input is never touched and the
//! output keeps the input order. All active predicates must hold.

use chrono::NaiveDate;
use common::forms::FormErrors;
use serde::Deserialize;

use crate::models::{Artwork, ArtworkView, parse_collection_ref};

/// Structured filter state next to the free-text query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtworkFilters {
    pub collection_id: Option<i64>,
    /// Case-insensitive substring of the owner, empty passes everything
    pub owner: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ArtworkFilters {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether an artwork passes every active filter and the query
    pub fn matches(&self, artwork: &Artwork, query: &str) -> bool {
        matches_query(artwork, query)
            && self
                .collection_id
                .is_none_or(|id| artwork.collection_id == Some(id))
            && contains_ignore_case(&artwork.owner, self.owner.trim())
            && self.date_from.is_none_or(|from| artwork.date >= from)
            && self.date_to.is_none_or(|to| artwork.date <= to)
    }
}

/// Anything that wraps an artwork can be filtered
pub trait AsArtwork {
    fn as_artwork(&self) -> &Artwork;
}

impl AsArtwork for Artwork {
    fn as_artwork(&self) -> &Artwork {
        self
    }
}

impl AsArtwork for ArtworkView {
    fn as_artwork(&self) -> &Artwork {
        &self.artwork
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_query(artwork: &Artwork, query: &str) -> bool {
    let query = query.trim();
    query.is_empty()
        || contains_ignore_case(&artwork.title, query)
        || contains_ignore_case(artwork.notes_text(), query)
        || contains_ignore_case(&artwork.owner, query)
}

/// Stable subset of `artworks` matching the query and filters
pub fn filter_artworks<T: AsArtwork + Clone>(
    artworks: &[T],
    query: &str,
    filters: &ArtworkFilters,
) -> Vec<T> {
    artworks
        .iter()
        .filter(|item| filters.matches(item.as_artwork(), query))
        .cloned()
        .collect()
}

/// Filter fields that can be set one at a time from the gallery view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    CollectionId,
    Owner,
    DateFrom,
    DateTo,
}

impl FilterField {
    pub fn key(&self) -> &'static str {
        match self {
            FilterField::CollectionId => "collectionId",
            FilterField::Owner => "owner",
            FilterField::DateFrom => "dateFrom",
            FilterField::DateTo => "dateTo",
        }
    }
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid date: {}", value))
}

impl ArtworkFilters {
    /// Set one filter from its raw text; blank clears it
    pub fn set(&mut self, field: FilterField, value: &str) -> Result<(), String> {
        match field {
            FilterField::CollectionId => self.collection_id = parse_collection_ref(value)?,
            FilterField::Owner => self.owner = value.trim().to_string(),
            FilterField::DateFrom => self.date_from = parse_date(value)?,
            FilterField::DateTo => self.date_to = parse_date(value)?,
        }
        Ok(())
    }
}

/// Search parameters as they arrive in a query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

impl SearchParams {
    /// Parse into a query and filters, reporting every unparseable value
    pub fn parse(&self) -> Result<(String, ArtworkFilters), FormErrors> {
        let mut filters = ArtworkFilters::default();
        let mut errors = FormErrors::new();
        let fields = [
            (FilterField::CollectionId, &self.collection_id),
            (FilterField::Owner, &self.owner),
            (FilterField::DateFrom, &self.date_from),
            (FilterField::DateTo, &self.date_to),
        ];
        for (field, raw) in fields {
            if let Some(raw) = raw
                && let Err(message) = filters.set(field, raw)
            {
                errors.add(field.key(), message);
            }
        }
        errors.into_result()?;

        let query = self.q.as_deref().unwrap_or_default().trim().to_string();
        Ok((query, filters))
    }

    /// No parameter carries a value
    pub fn is_blank(&self) -> bool {
        [
            &self.q,
            &self.collection_id,
            &self.owner,
            &self.date_from,
            &self.date_to,
        ]
        .iter()
        .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_artworks;

    fn titles(artworks: &[Artwork]) -> Vec<&str> {
        artworks.iter().map(|a| a.title.as_str()).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let artworks = seed_artworks().unwrap();
        let result = filter_artworks(&artworks, "", &ArtworkFilters::default());
        assert_eq!(result, artworks);
    }

    #[test]
    fn query_matches_title_notes_or_owner() {
        let artworks = seed_artworks().unwrap();
        assert_eq!(
            titles(&filter_artworks(&artworks, "sun", &ArtworkFilters::default())),
            vec!["Sunset Bay"]
        );
        assert_eq!(
            titles(&filter_artworks(&artworks, "JOHNSON", &ArtworkFilters::default())),
            vec!["Mountain View"]
        );
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let artworks = seed_artworks().unwrap();
        let filters = ArtworkFilters {
            date_from: Some(date("2024-01-01")),
            date_to: Some(date("2024-01-31")),
            ..Default::default()
        };
        assert_eq!(
            titles(&filter_artworks(&artworks, "", &filters)),
            vec!["Sunset Bay", "Mountain View"]
        );
    }

    #[test]
    fn predicates_are_anded() {
        let artworks = seed_artworks().unwrap();
        let filters = ArtworkFilters {
            collection_id: Some(1),
            owner: "personal".to_string(),
            ..Default::default()
        };
        let result = filter_artworks(&artworks, "", &filters);
        assert!(result.iter().all(|a| a.collection_id == Some(1)));
        assert!(result.iter().all(|a| a.owner == "Personal Collection"));
        assert!(!result.is_empty());

        assert!(filter_artworks(&artworks, "portrait", &filters).is_empty());
    }

    #[test]
    fn artworks_without_collection_fail_collection_filter() {
        let artworks = seed_artworks().unwrap();
        let filters = ArtworkFilters {
            collection_id: Some(3),
            ..Default::default()
        };
        assert_eq!(
            titles(&filter_artworks(&artworks, "", &filters)),
            vec!["Chromatic Drift"]
        );
    }

    #[test]
    fn search_params_parse_and_reject() {
        let params = SearchParams {
            q: Some("  bay ".to_string()),
            collection_id: Some("1".to_string()),
            date_from: Some(" ".to_string()),
            ..Default::default()
        };
        let (query, filters) = params.parse().unwrap();
        assert_eq!(query, "bay");
        assert_eq!(filters.collection_id, Some(1));
        assert_eq!(filters.date_from, None);

        let bad = SearchParams {
            collection_id: Some("abc".to_string()),
            date_to: Some("31/01/2024".to_string()),
            ..Default::default()
        };
        let errors = bad.parse().unwrap_err();
        assert!(errors.contains("collectionId"));
        assert!(errors.contains("dateTo"));
    }

    #[test]
    fn blank_params() {
        assert!(SearchParams::default().is_blank());
        let params = SearchParams {
            owner: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(params.is_blank());
    }
}
