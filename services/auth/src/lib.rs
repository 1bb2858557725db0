//! Authentication service
//!
//! Registers and signs in users, issues the bearer tokens the gallery service
//! accepts, and keeps the client-side session across restarts.

pub mod accounts;
pub mod error;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod session;
pub mod state;
pub mod validation;

pub use state::AppState;
