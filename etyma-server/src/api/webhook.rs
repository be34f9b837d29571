//! Payment processor webhook
//!
//! The signature covers the exact request bytes, so the body is taken raw
//! and only parsed after verification.

use crate::services::webhook_signature::{self, SIGNATURE_HEADER};
use crate::services::stripe_client::WebhookEvent;
use crate::services::FulfillmentError;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, warn};

/// POST /api/webhook
///
/// **Errors:**
/// - 400 `No signature` / `Invalid signature`
/// - 400 `Missing data`: completed checkout without order id or email
/// - 503: webhook secret not configured
///
/// Order misses and delivery failures still answer 200 with a `warning`,
/// since redelivery would not help.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("No signature".to_string()))?;

    let stripe = &state.config.stripe;
    let secret = stripe.webhook_secret.as_deref().ok_or_else(|| {
        error!("Webhook received but no webhook secret is configured");
        ApiError::ServiceUnavailable("Webhook secret not configured".to_string())
    })?;

    if let Err(e) = webhook_signature::verify(
        &body,
        signature,
        secret,
        Utc::now().timestamp(),
        stripe.signature_tolerance_secs,
    ) {
        warn!(error = %e, "Webhook signature verification failed");
        return Err(ApiError::BadRequest("Invalid signature".to_string()));
    }

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Signed webhook payload is not an event");
        ApiError::BadRequest("Invalid payload".to_string())
    })?;

    match state.fulfillment.handle_event(&event).await {
        Ok(outcome) => {
            if let Some(warning) = outcome.warning() {
                state
                    .record_error(format!("webhook {}: {}", event.id, warning))
                    .await;
                Ok(Json(json!({ "received": true, "warning": warning })))
            } else {
                Ok(Json(json!({ "received": true })))
            }
        }
        Err(FulfillmentError::MissingData) | Err(FulfillmentError::MalformedSession(_)) => {
            Err(ApiError::BadRequest("Missing data".to_string()))
        }
    }
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/api/webhook", post(handle_webhook))
}
