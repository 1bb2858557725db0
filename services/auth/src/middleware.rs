//! Middleware for JWT token validation and authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::debug;

use crate::{error::AuthError, state::AppState};

/// Authenticated user, with the token it presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Require a valid, unrevoked bearer token
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::InvalidToken)?;

    let claims = state
        .accounts
        .authenticate(bearer.token())
        .await
        .inspect_err(|e| debug!("Rejected bearer token: {}", e))?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
        token: bearer.token().to_string(),
    });

    Ok(next.run(req).await)
}
