//! token-relay - A minimal GitHub OAuth relay
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Routes (Axum)                           │
//! │  - GET /login, GET /callback                                │
//! │  - GET /token/:token                                        │
//! │  - GET /health, GET /metrics                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Authentication Relay                       │
//! │  - CSRF state, callback validation                          │
//! │  - Session codec (pass-through)                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     OAuth Strategy                           │
//! │  - GitHub authorize / token endpoints (oauth2)              │
//! │  - GitHub user endpoint (reqwest)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: token landing page and metrics endpoint
//! - `auth`: GitHub OAuth relay and routes
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

/// Application state shared across all handlers
///
/// Cloned for each request. The relay is built once at startup and
/// injected here; handlers never reach for global registrations.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// OAuth relay (strategy + session codec)
    pub relay: auth::AuthRelay,
}

impl AppState {
    /// Initialize application state with the GitHub strategy
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("token-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let strategy = auth::GitHubStrategy::new(config.github.clone(), http_client);
        let relay = auth::AuthRelay::new(Arc::new(strategy), Arc::new(auth::PassThroughCodec));

        tracing::info!(
            provider = relay.provider(),
            scopes = ?config.github.scopes,
            callback_url = %config.github.callback_url,
            "OAuth relay configured"
        );

        Ok(Self::with_relay(config, relay))
    }

    /// Assemble state around an already-built relay
    pub fn with_relay(config: config::AppConfig, relay: auth::AuthRelay) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(auth::auth_router())
        .merge(api::token_router())
        .merge(api::metrics_router())
        .fallback(not_found)
        .layer(axum::middleware::from_fn(track_requests))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Request span keyed by route template
///
/// The raw URI is left out: `/token/:token` and `/callback?code=` carry
/// credentials.
fn request_span(request: &Request) -> tracing::Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched");

    tracing::debug_span!("request", method = %request.method(), route)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> error::AppError {
    error::AppError::NotFound
}

/// Count requests by route template and status
async fn track_requests(matched: Option<MatchedPath>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = matched
        .as_ref()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched")
        .to_owned();

    let response = next.run(request).await;

    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();

    response
}
