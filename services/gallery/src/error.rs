//! Custom error types for the gallery service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::StoreError, forms::FormErrors};
use serde_json::json;
use thiserror::Error;

/// Failure of a catalog write
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No record with the given id
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// The operation would break a catalog invariant
    #[error("{0}")]
    Conflict(String),

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn artwork_not_found(id: i64) -> Self {
        CatalogError::NotFound {
            kind: "Artwork",
            id,
        }
    }

    pub fn collection_not_found(id: i64) -> Self {
        CatalogError::NotFound {
            kind: "Collection",
            id,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error type for the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// The request could not be read: malformed id, query or body
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(FormErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The record store could not complete the request
    #[error("Record store error: {0}")]
    Upstream(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CatalogError::Conflict(message) => ApiError::Conflict(message),
            CatalogError::Store(store) => ApiError::Upstream(store.describe()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormErrors> for ApiError {
    fn from(fields: FormErrors) -> Self {
        ApiError::Validation(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({"error": "Unauthorized"})),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Validation failed", "fields": fields}),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({"error": msg})),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({"error": msg})),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, json!({"error": msg})),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
