//! Error types for token-relay
//!
//! Request-facing errors are converted to `AppError`, which implements
//! `IntoResponse`. OAuth handshake failures use `AuthError` and never
//! reach the client as an error response; the callback route turns them
//! into a redirect back to `/login`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// HTTP client error (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string(), "http_client"),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[error_type])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// OAuth handshake failure
///
/// Transient and permanent provider failures are not distinguished;
/// every variant ends in the same redirect to `/login`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider reported an error on the callback (e.g. `access_denied`)
    #[error("Provider denied authorization: {error} ({description:?})")]
    Denied {
        error: String,
        description: Option<String>,
    },

    /// Callback arrived without an authorization code
    #[error("Missing authorization code")]
    MissingCode,

    /// CSRF state cookie absent or different from the callback's state
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// Code-for-token exchange failed or was rejected
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Profile lookup with the issued token failed
    #[error("Profile fetch failed: {0}")]
    Profile(String),

    /// Transport failure talking to the provider
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl AuthError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Denied { .. } => "denied",
            AuthError::MissingCode => "missing_code",
            AuthError::StateMismatch => "state_mismatch",
            AuthError::TokenExchange(_) => "token_exchange",
            AuthError::Profile(_) => "profile",
            AuthError::Http(_) => "http",
        }
    }
}
