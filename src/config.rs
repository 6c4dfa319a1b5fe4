//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. `.env` file in the working directory (if present)
//! 3. Environment variables (override)
//!
//! Only defaulting is applied. Missing OAuth credentials are not an error;
//! the provider rejects the handshake at runtime instead.

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

/// Port used when `PORT` is unset or cannot be parsed
pub const DEFAULT_PORT: u16 = 3000;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GitHubOAuthConfig,
    pub logging: LoggingConfig,
    /// Deployment environment ("development", "production", ...)
    pub environment: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000)
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string handed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// GitHub OAuth configuration
#[derive(Debug, Clone)]
pub struct GitHubOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered with the OAuth app
    pub callback_url: Url,
    /// Scopes requested on login (default: notifications, repo)
    pub scopes: Vec<String>,
    pub authorize_url: Url,
    pub token_url: Url,
    /// API base; the profile is read from `<api_url>/user`
    pub api_url: Url,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

/// Flat view of the environment as the `config` crate sees it.
///
/// Everything is read as a string so that a malformed `PORT` falls back
/// to the default instead of failing deserialization.
#[derive(Debug, Deserialize)]
struct RawConfig {
    host: String,
    port: String,
    github_client_id: String,
    github_client_secret: String,
    github_callback_url: Option<String>,
    github_scopes: String,
    github_authorize_url: String,
    github_token_url: String,
    github_api_url: String,
    log_format: String,
    app_env: String,
}

impl AppConfig {
    /// Build configuration from the environment
    ///
    /// When `vars` is given it replaces the process environment, which
    /// keeps tests independent of the host.
    pub fn from_env(vars: Option<HashMap<String, String>>) -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment};

        let raw: RawConfig = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", DEFAULT_PORT.to_string())?
            .set_default("github_client_id", "")?
            .set_default("github_client_secret", "")?
            .set_default("github_scopes", "notifications,repo")?
            .set_default(
                "github_authorize_url",
                "https://github.com/login/oauth/authorize",
            )?
            .set_default(
                "github_token_url",
                "https://github.com/login/oauth/access_token",
            )?
            .set_default("github_api_url", "https://api.github.com")?
            .set_default("log_format", "pretty")?
            .set_default("app_env", "production")?
            .add_source(Environment::default().source(vars))
            .build()?
            .try_deserialize()?;

        let port = parse_port(&raw.port);
        let callback_url = raw
            .github_callback_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}/callback"));
        let callback_url = parse_url("GITHUB_CALLBACK_URL", &callback_url)?;

        Ok(Self {
            server: ServerConfig {
                host: raw.host,
                port,
            },
            github: GitHubOAuthConfig {
                client_id: raw.github_client_id,
                client_secret: raw.github_client_secret,
                callback_url,
                scopes: parse_scopes(&raw.github_scopes),
                authorize_url: parse_url("GITHUB_AUTHORIZE_URL", &raw.github_authorize_url)?,
                token_url: parse_url("GITHUB_TOKEN_URL", &raw.github_token_url)?,
                api_url: parse_url("GITHUB_API_URL", &raw.github_api_url)?,
            },
            logging: LoggingConfig {
                format: raw.log_format,
            },
            environment: raw.app_env,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

fn parse_port(value: &str) -> u16 {
    value.trim().parse().unwrap_or(DEFAULT_PORT)
}

fn parse_scopes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_url(name: &str, value: &str) -> Result<Url, crate::error::AppError> {
    Url::parse(value.trim())
        .map_err(|e| crate::error::AppError::Config(format!("{name} is not a valid URL: {e}")))
}
