// File: services/storefront_backend/src/main.rs
use storefront_backend::{app, app_state::AppState};
use storefront_common::logging::{init_with_level, parse_level};
use storefront_config::load_config;
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_with_level(parse_level(&config.logging.level));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::initialize(config).await;
    let db = state.db.clone();

    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.shutdown().await;
    }
    Ok(())
}
