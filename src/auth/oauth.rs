//! GitHub OAuth routes
//!
//! Implements the browser side of the authorization code flow.

use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::relay::CallbackParams;
use crate::AppState;
use crate::metrics::{OAUTH_CALLBACKS_TOTAL, OAUTH_LOGINS_TOTAL};

/// Cookie binding the CSRF state to the browser that started the login
const STATE_COOKIE: &str = "oauth_state";

/// Create authentication router
///
/// Routes:
/// - GET /login - Redirect to GitHub
/// - GET /callback - OAuth callback
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
}

/// GET /login
///
/// Redirects the user agent to the provider's authorization page.
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect to GitHub with client_id, redirect_uri, scope, state
async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let target = state.relay.begin_login();
    OAUTH_LOGINS_TOTAL
        .with_label_values(&[state.relay.provider()])
        .inc();

    let cookie = Cookie::build((STATE_COOKIE, target.csrf_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.github.callback_url.scheme() == "https");

    (jar.add(cookie), Redirect::to(target.url.as_str()))
}

/// GET /callback
///
/// Handles the OAuth callback from GitHub.
///
/// On success redirects to `/token/<access_token>`. Every failure
/// (denied consent, stale code, bad state, provider outage) redirects
/// back to `/login`. A code without the `oauth_state` cookie set by
/// `/login` is never exchanged.
async fn callback(
    State(state): State<AppState>,
    query: Option<Query<CallbackParams>>,
    jar: CookieJar,
) -> impl IntoResponse {
    // Malformed query strings count as an unconfirmed login.
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let expected_state = jar.get(STATE_COOKIE).map(|cookie| cookie.value().to_owned());
    let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));

    match state
        .relay
        .handle_callback(params, expected_state.as_deref())
        .await
    {
        Ok(identity) => {
            OAUTH_CALLBACKS_TOTAL
                .with_label_values(&["success", "none"])
                .inc();
            let location = format!("/token/{}", urlencoding::encode(&identity.access_token));
            (jar, Redirect::to(&location))
        }
        Err(error) => {
            tracing::debug!(%error, reason = error.kind(), "OAuth callback failed");
            OAUTH_CALLBACKS_TOTAL
                .with_label_values(&["failure", error.kind()])
                .inc();
            (jar, Redirect::to("/login"))
        }
    }
}
