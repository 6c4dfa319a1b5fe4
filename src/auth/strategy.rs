//! OAuth provider strategies
//!
//! A strategy knows how to talk to one provider: where to send the
//! browser, how to trade an authorization code for a token, and where to
//! read the user's profile. The relay drives the handshake through this
//! trait and never sees provider wire formats.

use axum::async_trait;
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, HttpClientError, RedirectUrl, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use crate::config::GitHubOAuthConfig;
use crate::error::AuthError;

/// Tokens returned by a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// A provider-specific OAuth 2.0 authorization code flow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthStrategy: Send + Sync {
    /// Provider name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Provider authorization URL and the fresh CSRF state it carries
    fn authorize_url(&self) -> (Url, CsrfToken);

    /// Exchange an authorization code for tokens
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError>;

    /// Fetch the provider profile for an access token
    async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, AuthError>;
}

/// Client with the authorize and token endpoints set
type GitHubClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Error body of the GitHub token endpoint
///
/// GitHub answers 200 even for rejected codes, with `error` set instead
/// of `access_token`, which fails token parsing.
#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    error: String,
    error_description: Option<String>,
}

/// GitHub OAuth app strategy
pub struct GitHubStrategy {
    client: GitHubClient,
    scopes: Vec<String>,
    api_url: Url,
    http: reqwest::Client,
}

impl GitHubStrategy {
    /// Build the strategy; `http` should not follow redirects
    pub fn new(config: GitHubOAuthConfig, http: reqwest::Client) -> Self {
        let client = BasicClient::new(ClientId::new(config.client_id))
            .set_client_secret(ClientSecret::new(config.client_secret))
            .set_auth_uri(AuthUrl::from_url(config.authorize_url))
            .set_token_uri(TokenUrl::from_url(config.token_url))
            .set_redirect_uri(RedirectUrl::from_url(config.callback_url))
            .set_auth_type(AuthType::RequestBody);

        Self {
            client,
            scopes: config.scopes,
            api_url: config.api_url,
            http,
        }
    }

    fn profile_url(&self) -> String {
        format!("{}/user", self.api_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl OAuthStrategy for GitHubStrategy {
    fn name(&self) -> &'static str {
        "github"
    }

    fn authorize_url(&self) -> (Url, CsrfToken) {
        self.client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(&self.http)
            .await
            .map_err(token_error)?;

        let access_token = token.access_token().secret().clone();
        if access_token.is_empty() {
            return Err(AuthError::TokenExchange(
                "response had no access_token".to_string(),
            ));
        }

        Ok(TokenGrant {
            access_token,
            refresh_token: token.refresh_token().map(|token| token.secret().clone()),
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, AuthError> {
        let response = self
            .http
            .get(self.profile_url())
            .bearer_auth(access_token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Profile(format!(
                "profile endpoint returned {status}"
            )));
        }

        Ok(response.json().await?)
    }
}

/// Map an `oauth2` token request failure onto the relay's error type
fn token_error(
    error: RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>,
) -> AuthError {
    match error {
        RequestTokenError::ServerResponse(response) => AuthError::TokenExchange(
            response
                .error_description()
                .cloned()
                .unwrap_or_else(|| response.error().to_string()),
        ),
        RequestTokenError::Parse(_, body) => AuthError::TokenExchange(error_body_message(&body)),
        RequestTokenError::Request(HttpClientError::Reqwest(error)) => AuthError::Http(*error),
        other => AuthError::TokenExchange(other.to_string()),
    }
}

/// Message for a token endpoint body that is not a token response
fn error_body_message(body: &[u8]) -> String {
    match serde_json::from_slice::<GitHubErrorBody>(body) {
        Ok(body) => body.error_description.unwrap_or(body.error),
        Err(_) => "token endpoint returned an unexpected response".to_string(),
    }
}
