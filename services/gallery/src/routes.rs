//! Gallery service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult, CatalogError},
    filter::SearchParams,
    middleware::{AuthUser, auth_middleware},
    state::AppState,
    upload::BulkUploadRequest,
    validation::{ArtworkForm, CollectionForm},
};

/// Extractors whose rejections use the JSON error body
type IdPath = WithRejection<Path<i64>, ApiError>;
type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Create the router for the gallery service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/artworks", get(list_artworks).post(create_artwork))
        .route("/artworks/bulk", post(bulk_upload))
        .route(
            "/artworks/:id",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/:id",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route("/collections/:id/artworks", get(collection_artworks))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Log a failed write before it is mapped to a response
fn write_failed(action: &str, err: CatalogError) -> ApiError {
    match &err {
        CatalogError::Store(e) => error!("Failed to {}: {}", action, e.describe()),
        other => info!("Refused to {}: {}", action, other),
    }
    ApiError::from(err)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "gallery-service"
    }))
}

/// List or search artworks
pub async fn list_artworks(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let artworks = if params.is_blank() {
        state.catalog.artworks.list().await
    } else {
        let (query, filters) = params.parse()?;
        state.catalog.artworks.search(&query, &filters).await
    };
    Ok(Json(artworks))
}

pub async fn get_artwork(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<impl IntoResponse> {
    let artwork = state
        .catalog
        .artworks
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Artwork {} not found", id)))?;
    Ok(Json(artwork))
}

pub async fn create_artwork(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(form), _): JsonBody<ArtworkForm>,
) -> ApiResult<impl IntoResponse> {
    let draft = form.into_draft(&state.media_base_url)?;
    let artwork = state
        .catalog
        .artworks
        .create(draft)
        .await
        .map_err(|e| write_failed("create artwork", e))?;
    info!("User {} added artwork {}", user.id, artwork.id);
    Ok((StatusCode::CREATED, Json(artwork)))
}

pub async fn update_artwork(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(form), _): JsonBody<ArtworkForm>,
) -> ApiResult<impl IntoResponse> {
    let draft = form.into_draft(&state.media_base_url)?;
    let artwork = state
        .catalog
        .artworks
        .update(id, draft)
        .await
        .map_err(|e| write_failed("update artwork", e))?;
    Ok(Json(artwork))
}

pub async fn delete_artwork(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .catalog
        .artworks
        .delete(id)
        .await
        .map_err(|e| write_failed("delete artwork", e))?;
    Ok(Json(json!({"message": "Artwork deleted successfully"})))
}

/// Create one artwork per uploaded file
pub async fn bulk_upload(
    State(state): State<AppState>,
    WithRejection(Json(request), _): JsonBody<BulkUploadRequest>,
) -> ApiResult<impl IntoResponse> {
    let items = request.into_items(&state.media_base_url, Utc::now().date_naive())?;
    let report = state
        .catalog
        .artworks
        .bulk_create(items, |progress| {
            tracing::debug!(
                "Bulk upload {}% ({}/{}): {}",
                progress.percentage,
                progress.completed,
                progress.total,
                progress.current_file
            );
        })
        .await;
    Ok(Json(report))
}

pub async fn list_collections(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.collections.list().await)
}

pub async fn get_collection(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<impl IntoResponse> {
    let collection = state
        .catalog
        .collections
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Collection {} not found", id)))?;
    Ok(Json(collection))
}

pub async fn create_collection(
    State(state): State<AppState>,
    WithRejection(Json(form), _): JsonBody<CollectionForm>,
) -> ApiResult<impl IntoResponse> {
    let draft = form.into_draft()?;
    let collection = state
        .catalog
        .collections
        .create(draft)
        .await
        .map_err(|e| write_failed("create collection", e))?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn update_collection(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(form), _): JsonBody<CollectionForm>,
) -> ApiResult<impl IntoResponse> {
    let draft = form.into_draft()?;
    let collection = state
        .catalog
        .collections
        .update(id, draft)
        .await
        .map_err(|e| write_failed("update collection", e))?;
    Ok(Json(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<impl IntoResponse> {
    state
        .catalog
        .collections
        .delete(id)
        .await
        .map_err(|e| write_failed("delete collection", e))?;
    Ok(Json(json!({"message": "Collection deleted successfully"})))
}

/// Collection detail with its artworks
pub async fn collection_artworks(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<impl IntoResponse> {
    let detail = state
        .catalog
        .collections
        .with_artworks(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Collection {} not found", id)))?;
    Ok(Json(detail))
}
