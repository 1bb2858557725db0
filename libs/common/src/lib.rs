//! Common library for the Artfolio services
//!
//! This crate provides shared functionality used across the gallery and
//! authentication services, including configuration, the remote record API
//! client, store and form error types, token signing and logging setup.

pub mod config;
pub mod error;
pub mod forms;
pub mod jwt;
pub mod records;
pub mod telemetry;

/// Example usage of the record client
///
/// ```rust,no_run
/// use common::config::AppConfig;
/// use common::records::{FetchQuery, RecordClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::load()?;
///     let client = RecordClient::from_config(&config.backend)?;
///     let rows: Vec<serde_json::Value> = client
///         .fetch_records("collection", &FetchQuery::fields(&["Id", "name"]))
///         .await?;
///     println!("{} collections", rows.len());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
