//! Custom error types for the authentication service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::StoreError, forms::FormErrors};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The request could not be read: malformed id or body
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Submitted values did not pass form validation
    #[error("Validation failed")]
    Validation(FormErrors),

    /// Unknown email or wrong password; the two are not distinguished
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    /// Missing, malformed, expired or revoked token
    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    /// Password change with the wrong current password
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PathRejection> for AuthError {
    fn from(rejection: PathRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl From<FormErrors> for AuthError {
    fn from(fields: FormErrors) -> Self {
        AuthError::Validation(fields)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            AuthError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Validation failed", "fields": fields}),
            ),
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, json!({"error": self.to_string()}))
            }
            AuthError::EmailTaken => (StatusCode::CONFLICT, json!({"error": self.to_string()})),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, json!({"error": self.to_string()})),
            AuthError::IncorrectPassword => {
                let message = self.to_string();
                (
                    StatusCode::BAD_REQUEST,
                    json!({"error": message, "fields": {"currentPassword": message}}),
                )
            }
            AuthError::Store(err) => {
                error!("Record store error: {}", err);
                (StatusCode::BAD_GATEWAY, json!({"error": err.describe()}))
            }
            AuthError::Internal(err) => {
                error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
