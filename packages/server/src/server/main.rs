// Main entry point for API server

use anyhow::{Context, Result};
use harbor_server::{
    kernel::ServerDeps,
    server::{build_app, AppState},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harbor_server=debug,audit_engine=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Harbor audit server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    if config.audit_secret.is_none() {
        tracing::warn!("AUDIT_SECRET not set; audit routes will refuse every request");
    }

    // Build providers, store, orchestrator
    let deps = ServerDeps::from_config(&config)
        .await
        .context("Failed to build server dependencies")?;
    tracing::info!(providers = ?deps.providers_configured, "Providers configured");

    // Build application
    let app = build_app(AppState::new(deps, config.audit_secret.clone()));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
