pub mod accounts;
pub mod analysis;
pub mod api;
pub mod community;
pub mod config;
pub mod core_state;
pub mod db;
pub mod hypotheses;
pub mod journal;
pub mod labs;
pub mod models;
pub mod validation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Start the service and serve until Ctrl-C.
pub async fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env();
    let core = Arc::new(core_state::CoreState::new(config));

    // Fail fast on an unusable database path
    core.open_db().map_err(|e| format!("Cannot open database: {e}"))?;
    tracing::info!(
        db = %core.db_path().display(),
        ai_configured = core.ai_configured(),
        "Journal database ready"
    );

    let mut server = api::start_api_server(core.clone(), core.config.bind_addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
