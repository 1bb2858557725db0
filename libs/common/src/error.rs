//! Custom error types for the common library
//!
//! This module defines the error type shared by every storage backend, in
//! memory or remote, so services can treat both the same way.

use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-field failure detail reported by the record API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

/// Custom error type for record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response
    #[error("Record API transport error: {0}")]
    Transport(#[source] ReqwestError),

    /// The record API answered with a non-success HTTP status
    #[error("Record API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The record API answered but refused the operation
    #[error("Record API rejected the request: {message}")]
    Rejected {
        message: String,
        fields: Vec<FieldError>,
    },

    /// The payload could not be mapped onto the expected shape
    #[error("Malformed record payload: {0}")]
    Decode(String),

    /// No backend is reachable with the current configuration
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl From<ReqwestError> for StoreError {
    fn from(err: ReqwestError) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl StoreError {
    /// Human-readable summary including per-field details, if any
    pub fn describe(&self) -> String {
        match self {
            StoreError::Rejected { message, fields } if !fields.is_empty() => {
                let details: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}: {}", f.field_label, f.message))
                    .collect();
                format!("{} ({})", message, details.join(", "))
            }
            other => other.to_string(),
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
