//! HTTP server binary for the Scenery backend.
//!
//! # Startup Sequence
//!
//! 1. Load `.env` if present
//! 2. Load configuration from the environment
//! 3. Initialize structured logging (tracing)
//! 4. Connect the write pool, then the read pool
//! 5. Serve HTTP until `Ctrl-C` or `SIGTERM`
//! 6. Drain both pools

use std::sync::Arc;

use scenery_api::{AppState, GithubClient, shutdown_signal, start_server};
use scenery_db::DataAccess;
use scenery_server::{AppConfig, telemetry};
use tracing::{error, info};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, either pool fails to
/// connect, or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment file.
    let dotenv = dotenvy::dotenv().ok();

    // 2-3. Configuration, then logging in the configured format.
    let config = AppConfig::from_env()?;
    telemetry::init(config.log_format);
    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    info!(
        mode = config.mode.as_str(),
        write = %config.data.write.redacted_url(),
        read = %config.data.read.redacted_url(),
        shared = config.data.shares_target(),
        "scenery-server starting"
    );

    // 4. Data access.
    let data = Arc::new(DataAccess::new(&config.data)?);
    if let Err(e) = data.initialize().await {
        error!(error = %e, "Database initialization failed");
        return Err(e.into());
    }

    // 5. HTTP.
    let github = GithubClient::new(config.github_token.clone());
    let state = Arc::new(AppState::new(Arc::clone(&data), github, config.static_dir())?);
    let served = start_server(&config.server, state, shutdown_signal()).await;

    // 6. Drain pools whether or not serving succeeded.
    match data.shutdown().await {
        Ok(()) => info!("Database connections closed"),
        Err(e) => error!(error = %e, "Database shutdown finished with errors"),
    }

    served?;
    info!("scenery-server stopped");
    Ok(())
}
