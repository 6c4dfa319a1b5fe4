//! API layer
//!
//! HTTP handlers for:
//! - Token landing page
//! - Metrics (Prometheus)

pub mod metrics;
mod token;

pub use metrics::metrics_router;
pub use token::{TOKEN_PAGE_BODY, token_router};
