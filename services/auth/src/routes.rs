//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    error::{AuthError, AuthResult},
    middleware::{AuthUser, auth_middleware},
    models::{ChangePasswordRequest, LoginCredentials, ProfileUpdate, RegisterRequest},
    state::AppState,
};

/// JSON body whose rejection uses the JSON error body
type JsonBody<T> = WithRejection<Json<T>, AuthError>;

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
        .route("/auth/password", put(change_password))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let response = state.accounts.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<LoginCredentials>,
) -> AuthResult<impl IntoResponse> {
    let response = state.accounts.login(payload).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AuthResult<impl IntoResponse> {
    state.accounts.logout(&user.token).await?;
    Ok(Json(json!({"message": "Logged out successfully"})))
}

/// The signed-in user
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AuthResult<impl IntoResponse> {
    let user = state.accounts.current_user(&user.token).await?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): JsonBody<ProfileUpdate>,
) -> AuthResult<impl IntoResponse> {
    let updated = state.accounts.update_profile(user.id, payload).await?;
    Ok(Json(updated))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): JsonBody<ChangePasswordRequest>,
) -> AuthResult<impl IntoResponse> {
    state.accounts.change_password(user.id, payload).await?;
    Ok(Json(json!({"message": "Password updated successfully"})))
}

pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.accounts.list().await)
}

pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let user = state.accounts.get(id).await.ok_or(AuthError::UserNotFound)?;
    Ok(Json(user))
}
