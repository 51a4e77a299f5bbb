//! udyam_server - REST backend for the registration wizard.
//!
//! See `udyam::config` for the environment variables it reads.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use udyam::api::build_router;
use udyam::config::ServerConfig;
use udyam::store::build_store;
use udyam::telemetry::{init_tracing, DEFAULT_FILTER};
use udyam_core::{RegistrationService, SchemaProvider};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_FILTER);

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let schema = SchemaProvider::load(&config.schema_source)
        .with_context(|| format!("failed to load form schema from {}", config.schema_source))?;
    tracing::info!(
        source = %config.schema_source,
        steps = schema.step_count(),
        "Form schema loaded"
    );

    let store = build_store(&config).await?;
    let service = Arc::new(RegistrationService::new(Arc::new(schema), store));
    let app = build_router(service);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("udyam_server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("udyam_server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
