//! RidePool service entry point
//!
//! Reads configuration from TOML file (~/.config/ridepool/config.toml),
//! connects to the database, runs migrations and serves the REST API.

use std::sync::Arc;

use tracing::{error, info};

use ridepool::auth::JwtConfig;
use ridepool::domain::RepositoryProvider;
use ridepool::{
    create_router, default_config_path, init_database, AppConfig, AppState,
    SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("RIDEPOOL_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting RidePool service...");

    let jwt_config = JwtConfig {
        secret: config.security.jwt_secret.clone(),
        expiration_hours: config.security.jwt_expiration_hours,
        issuer: "ridepool".to_string(),
    };

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&config.database.url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));

    // ── HTTP server ────────────────────────────────────────────
    let state = AppState::new(repos, jwt_config);
    let router = create_router(state);

    let address = config.server.address();
    info!("REST API listening on http://{}", address);
    info!("Swagger UI at http://{}/swagger-ui", address);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    } else {
        info!("Shutdown signal received");
    }
}
