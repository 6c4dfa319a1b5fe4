//! Common test utilities for E2E tests
//!
//! Starts the relay on an ephemeral port next to a mock GitHub OAuth
//! provider:
//!
//! - `/login/oauth/authorize` - immediate redirect back with a code
//! - `/login/oauth/access_token` - exchange code for token
//! - `/user` - profile for the issued token
//! - `/outage/...` - the same endpoints answering 500

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::json;
use token_relay::{AppState, config};
use tokio::net::TcpListener;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const MOCK_CODE: &str = "mock-authorization-code";
pub const MOCK_ACCESS_TOKEN: &str = "gho_mockAccessToken0123456789";

/// Credentials the mock provider accepts
#[derive(Clone)]
struct MockProviderState {
    client_id: String,
    client_secret: String,
}

/// Mock GitHub OAuth provider
pub struct MockProvider {
    pub addr: String,
}

impl MockProvider {
    pub async fn start() -> Self {
        let state = MockProviderState {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
        };

        let app = Router::new()
            .route("/login/oauth/authorize", get(authorize))
            .route("/login/oauth/access_token", post(access_token))
            .route("/user", get(user))
            .route("/outage/login/oauth/access_token", post(outage))
            .route("/outage/user", get(outage))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

async fn authorize(Query(params): Query<HashMap<String, String>>) -> Response {
    let Some(redirect_uri) = params.get("redirect_uri") else {
        return (StatusCode::BAD_REQUEST, "missing redirect_uri").into_response();
    };
    let mut target = url::Url::parse(redirect_uri).unwrap();
    target.query_pairs_mut().append_pair("code", MOCK_CODE);
    if let Some(state) = params.get("state") {
        target.query_pairs_mut().append_pair("state", state);
    }
    Redirect::to(target.as_str()).into_response()
}

async fn access_token(
    State(state): State<MockProviderState>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    if field(&form, "client_id") != state.client_id
        || field(&form, "client_secret") != state.client_secret
    {
        return Json(json!({
            "error": "incorrect_client_credentials",
            "error_description": "The client_id and/or client_secret passed are incorrect."
        }));
    }

    if field(&form, "code") != MOCK_CODE {
        return Json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }));
    }

    Json(json!({
        "access_token": MOCK_ACCESS_TOKEN,
        "token_type": "bearer",
        "scope": "notifications,repo"
    }))
}

async fn outage() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response()
}

fn field<'a>(form: &'a HashMap<String, String>, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or_default()
}

async fn user(headers: HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {MOCK_ACCESS_TOKEN}"));

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        )
            .into_response();
    }

    Json(json!({
        "login": "octocat",
        "id": 1,
        "name": "The Octocat"
    }))
    .into_response()
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub provider: MockProvider,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start a relay wired to a fresh mock provider
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Start a relay with extra environment overrides
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let overrides: Vec<(String, String)> = overrides
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self::with_provider_env(move |_| overrides).await
    }

    /// Start a relay with overrides that may point at the mock provider
    pub async fn with_provider_env(
        overrides: impl FnOnce(&MockProvider) -> Vec<(String, String)>,
    ) -> Self {
        let provider = MockProvider::start().await;

        // Bind first so the callback URL can point at the real port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let mut vars: HashMap<String, String> = HashMap::from([
            ("GITHUB_CLIENT_ID".to_string(), CLIENT_ID.to_string()),
            ("GITHUB_CLIENT_SECRET".to_string(), CLIENT_SECRET.to_string()),
            ("GITHUB_CALLBACK_URL".to_string(), format!("{addr}/callback")),
            (
                "GITHUB_AUTHORIZE_URL".to_string(),
                provider.url("/login/oauth/authorize"),
            ),
            (
                "GITHUB_TOKEN_URL".to_string(),
                provider.url("/login/oauth/access_token"),
            ),
            ("GITHUB_API_URL".to_string(), provider.addr.clone()),
        ]);
        vars.extend(overrides(&provider));

        let config = config::AppConfig::from_env(Some(vars)).unwrap();
        let state = AppState::new(config).unwrap();
        let app = token_relay::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr,
            provider,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Location header of a redirect
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}

/// `name=value` pair of the first Set-Cookie header with the given name
pub fn cookie_pair(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .find(|pair| pair.starts_with(&format!("{name}=")))
        .map(ToString::to_string)
}
