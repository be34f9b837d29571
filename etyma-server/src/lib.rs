//! etyma-server library interface
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

pub mod api;
pub mod error;
pub mod pdf;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use etyma_common::config::TomlConfig;
use services::{AnalysisClient, ArtClient, FulfillmentService, OrderStore, RelayClient, StripeClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<TomlConfig>,
    /// Orders waiting for payment
    pub orders: OrderStore,
    pub analysis: Arc<AnalysisClient>,
    pub art: Arc<ArtClient>,
    pub payments: Arc<StripeClient>,
    pub relay: Arc<RelayClient>,
    pub fulfillment: Arc<FulfillmentService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Build every upstream client from configuration
    pub fn from_config(config: TomlConfig) -> etyma_common::Result<Self> {
        let orders = OrderStore::new(Duration::from_secs(config.orders.ttl_secs));
        let analysis = Arc::new(AnalysisClient::new(&config.openai).map_err(client_error)?);
        let art = Arc::new(ArtClient::new(&config.art).map_err(client_error)?);
        let payments = Arc::new(StripeClient::new(&config.stripe).map_err(client_error)?);
        let relay = Arc::new(RelayClient::new(&config.relay).map_err(client_error)?);
        let fulfillment = Arc::new(FulfillmentService::new(
            orders.clone(),
            Arc::clone(&art),
            Arc::clone(&relay),
            config.server.public_url.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            orders,
            analysis,
            art,
            payments,
            relay,
            fulfillment,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }

    /// Remember the most recent failure for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

fn client_error(e: impl std::fmt::Display) -> etyma_common::Error {
    etyma_common::Error::Config(e.to_string())
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::analyze_routes())
        .merge(api::art_routes())
        .merge(api::order_routes())
        .merge(api::checkout_routes())
        .merge(api::webhook_routes())
        .merge(api::pdf_routes())
        .merge(api::lead_routes())
        .merge(api::gallery_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
