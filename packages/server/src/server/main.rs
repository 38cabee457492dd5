// Main entry point for the webhook server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::reconciliation::Reconciler;
use server_core::kernel::ServerDeps;
use server_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting membership access reconciler");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let deps = ServerDeps::from_config(&config).context("Failed to build provider clients")?;
    let reconciler = Arc::new(Reconciler::new(deps, config.sync_settings()));

    if config.webhook_token.is_none() {
        tracing::warn!("WEBHOOK_TOKEN not set, CRM webhooks are unauthenticated");
    }
    let app = build_app(reconciler, config.webhook_token.clone());

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
