//! Prometheus metrics endpoint
//!
//! Exposes relay counters in Prometheus text format.

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// Metrics endpoint handler
async fn metrics_handler() -> Result<Response, AppError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let metrics_text = encoder.encode_to_string(&metric_families).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode metrics");
        AppError::Internal(e.into())
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        metrics_text,
    )
        .into_response())
}

/// Create metrics router
///
/// Exposes the `/metrics` endpoint.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(metrics_handler))
}
