use std::sync::Arc;

use anyhow::Result;
use common::{
    config::AppConfig,
    jwt::{JwtConfig, JwtService},
    telemetry::init_tracing,
};
use gallery::{AppState, repositories::build_backend, routes, services::Catalog};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("gallery service");

    let config = AppConfig::load()?;
    if config.uses_dev_secret() {
        warn!("Using the development JWT secret; set ARTFOLIO__AUTH__JWT_SECRET");
    }

    let backend = build_backend(&config.backend)?;
    info!(
        "Catalog backend: {}, collection delete policy: {:?}",
        backend.name(),
        config.gallery.collection_delete_policy
    );

    let app_state = AppState {
        catalog: Catalog::new(backend, config.gallery.collection_delete_policy),
        jwt_service: JwtService::new(JwtConfig::from(&config.auth)),
        media_base_url: Arc::from(config.gallery.media_base_url.as_str()),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.gallery.bind).await?;
    info!("Gallery service listening on {}", config.gallery.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
