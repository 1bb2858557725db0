//! Application state shared across handlers

use std::sync::Arc;

use common::jwt::JwtService;

use crate::services::Catalog;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub jwt_service: JwtService,
    /// Prefix of stored media URLs
    pub media_base_url: Arc<str>,
}
