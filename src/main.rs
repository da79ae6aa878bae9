use std::sync::Arc;

use anyhow::{Context, Result};
use recipe_assistant::api;
use recipe_assistant::cli::parse_args;
use recipe_assistant::config::Settings;
use recipe_assistant::state::AppContext;
use recipe_assistant::telemetry::init_tracing;
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();

    let mut settings = match &cli_args.env_file {
        Some(path) => Settings::from_env_file(path)
            .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
        None => Settings::from_env().context("Failed to load settings from environment")?,
    };
    cli_args.apply(&mut settings);

    init_tracing(settings.debug);
    info!("Starting {} (storage: {})", settings.app_name, settings.storage);

    let bind_addr = format!("{}:{}", settings.host, settings.port);
    let context = Arc::new(
        AppContext::connect(settings)
            .await
            .context("Failed to initialize application context")?,
    );

    let app = api::router(context.clone());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Server listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    context.shutdown().await;
    served.context("Server error")?;
    Ok(())
}
