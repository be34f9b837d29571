//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Orders currently waiting for payment
    pub pending_orders: usize,
    /// Which upstream credentials are present
    pub configured: ConfiguredServices,
    /// Last error message if any (for diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfiguredServices {
    pub analysis: bool,
    pub art: bool,
    pub payments: bool,
    pub webhook: bool,
    pub relay: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;
    let last_error = state.last_error.read().await.clone();
    let config = &state.config;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "etyma".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        pending_orders: state.orders.len().await,
        configured: ConfiguredServices {
            analysis: config.openai.api_key.is_some(),
            art: config.art.api_key.is_some(),
            payments: config.stripe.secret_key.is_some(),
            webhook: config.stripe.webhook_secret.is_some(),
            relay: config.relay.api_key.is_some(),
        },
        last_error,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
