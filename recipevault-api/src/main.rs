//! # RecipeVault API Server
//!
//! REST API for a multi-tenant recipe catalog. Every authenticated user
//! owns a private collection of recipes, tags, and ingredients; nothing
//! is shared across accounts.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - JWT authentication (register, login, refresh)
//! - Recipe CRUD with tag/ingredient reconciliation and image upload
//! - Tag and ingredient management
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p recipevault-api
//! ```

use recipevault_api::{
    app::{build_router, AppState},
    config::Config,
};
use recipevault_shared::db::{migrations::run_migrations, pool::create_pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipevault_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "RecipeVault API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and apply pending migrations
    let pool = create_pool(recipevault_shared::db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    // Build and serve the application
    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
