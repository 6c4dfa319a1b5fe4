//! token-relay binary entry point

use token_relay::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "token_relay=info,tower_http=info";

/// Application entry point
///
/// # Setup
/// 1. Load `.env` and configuration
/// 2. Initialize tracing/logging with the configured format
/// 3. Initialize AppState (OAuth relay)
/// 4. Build Axum router
/// 5. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration; `.env` must be applied before anything reads the environment
    let dotenv = dotenvy::dotenv();
    let config = config::AppConfig::from_env(None);

    // 2. Initialize tracing/logging
    let json = config.as_ref().is_ok_and(|config| config.logging.is_json());
    init_tracing(json);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    let config = match config {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Invalid configuration");
            return Err(error.into());
        }
    };

    tracing::info!("Starting token-relay...");
    tracing::info!(
        port = config.server.port,
        log_format = %config.logging.format,
        "Configuration loaded"
    );

    if config.is_development() {
        tracing::info!("Running in development");
    }

    token_relay::metrics::init_metrics();

    // 3. Initialize application state
    let state = AppState::new(config.clone())?;

    // 4. Build Axum router
    let app = token_relay::build_router(state);

    // 5. Start HTTP server
    let addr = config.server.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, addr = %addr, "Failed to bind listener");
            return Err(error.into());
        }
    };

    tracing::info!("Listening on port {}", config.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
