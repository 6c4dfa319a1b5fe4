//! Token landing page

use axum::{Json, Router, routing::get};

/// Body returned for every token page
pub const TOKEN_PAGE_BODY: &str = "ヽ(´▽`)/";

/// Create token router
///
/// Routes:
/// - GET /token/:token - Landing page after a successful login
/// - GET /token/ - Same page for an empty segment
pub fn token_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/token/:token", get(token_page))
        .route("/token/", get(token_page))
}

/// GET /token/:token
///
/// Returns a fixed JSON string. The path segment is never extracted, so
/// empty or malformed segments cannot be rejected.
async fn token_page() -> Json<&'static str> {
    Json(TOKEN_PAGE_BODY)
}
