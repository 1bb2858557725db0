//! Mock catalog used when no record API is configured

use crate::models::{Artwork, Collection};

const ARTWORKS_JSON: &str = include_str!("../data/artworks.json");
const COLLECTIONS_JSON: &str = include_str!("../data/collections.json");

pub fn seed_artworks() -> serde_json::Result<Vec<Artwork>> {
    serde_json::from_str(ARTWORKS_JSON)
}

pub fn seed_collections() -> serde_json::Result<Vec<Collection>> {
    serde_json::from_str(COLLECTIONS_JSON)
}
