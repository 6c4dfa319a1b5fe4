//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("token_relay_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");

    // OAuth Metrics
    pub static ref OAUTH_LOGINS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("token_relay_oauth_logins_total", "Total number of OAuth logins started"),
        &["provider"]
    ).expect("metric can be created");
    pub static ref OAUTH_CALLBACKS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("token_relay_oauth_callbacks_total", "Total number of OAuth callbacks handled"),
        &["outcome", "reason"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("token_relay_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; registration happens on the first call.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("HTTP_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(OAUTH_LOGINS_TOTAL.clone()))
            .expect("OAUTH_LOGINS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(OAUTH_CALLBACKS_TOTAL.clone()))
            .expect("OAUTH_CALLBACKS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}
