// src/main.rs

use std::sync::Arc;

use aptimaster::config::Config;
use aptimaster::error::AppError;
use aptimaster::routes;
use aptimaster::state::AppState;
use aptimaster::store::{PlatformStore, persistence::JsonFileStorage};
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.ephemeral_secret {
        tracing::warn!("JWT_SECRET not set, sessions will not survive a restart");
    }

    // Rehydrate persisted state
    let storage = JsonFileStorage::open(&config.data_dir)?;
    tracing::info!(data_dir = %config.data_dir.display(), "Loading state...");
    let store = PlatformStore::load(Arc::new(storage), &config.default_meet_link)
        .inspect_err(|e: &AppError| tracing::error!("Failed to load state: {}", e))?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, config);

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}
