//! menu-cloud server entry point

use anyhow::Context;
use menu_cloud::{AppState, Config, api, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    logger::init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    tracing::info!(
        environment = %config.environment,
        base_domain = %config.base_domain,
        "Starting menu-cloud"
    );

    let state = AppState::new(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize state: {e}"))?;
    let app = api::router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;
    tracing::info!("menu-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("menu-cloud stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
