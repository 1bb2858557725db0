//! Logging setup shared by the service binaries

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing(service: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting {}", service);
}
