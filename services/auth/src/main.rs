use anyhow::Result;
use auth::{AppState, accounts::UserService, repositories::build_user_backend, routes};
use common::{
    config::AppConfig,
    jwt::{JwtConfig, JwtService},
    telemetry::init_tracing,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("auth service");

    let config = AppConfig::load()?;
    if config.uses_dev_secret() {
        warn!("Using the development JWT secret; set ARTFOLIO__AUTH__JWT_SECRET");
    }

    let backend = build_user_backend(&config.backend)?;
    info!("User backend: {}", backend.name());

    let app_state = AppState {
        accounts: UserService::new(backend, JwtService::new(JwtConfig::from(&config.auth))),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.auth.bind).await?;
    info!("Auth service listening on {}", config.auth.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
