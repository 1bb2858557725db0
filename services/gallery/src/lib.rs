//! Artwork gallery service
//!
//! Catalogs artworks and the collections that group them, over either a
//! seeded in-memory store or the hosted record API.

pub mod controller;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod upload;
pub mod validation;

pub use state::AppState;
