//! Checkout endpoints

use crate::services::CheckoutRequest;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutBody {
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// POST /api/checkout
///
/// **Request:** `{"orderId": "<uuid>"}`
/// **Response:** `{"url": "<hosted checkout page>"}`
///
/// **Errors:**
/// - 400: no order id
/// - 404: order unknown or expired
/// - 500: the processor's error message
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutBody>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    let order_id = payload
        .ok()
        .and_then(|Json(body)| body.order_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing orderId".to_string()))?;

    let not_found = || ApiError::NotFound("Order not found".to_string());
    let id = Uuid::parse_str(order_id.trim()).map_err(|_| not_found())?;
    let order = state.orders.get(&id).await.ok_or_else(not_found)?;

    let request = CheckoutRequest {
        order_id: order.id,
        customer_name: order.draft.name.clone(),
    };
    let session = state
        .payments
        .create_checkout_session(&request, &state.config.server.public_url)
        .await
        .map_err(|e| {
            error!(order_id = %id, error = %e, "Checkout error");
            ApiError::Internal(e.to_string())
        })?;

    let url = session
        .url
        .ok_or_else(|| ApiError::Internal("Checkout session has no URL".to_string()))?;
    Ok(Json(CheckoutResponse { url }))
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusQuery {
    pub session_id: Option<String>,
}

/// GET /api/order-status?session_id=
///
/// Feeds the confirmation page. Any lookup failure answers `{email: null}`.
pub async fn order_status(
    State(state): State<AppState>,
    Query(query): Query<OrderStatusQuery>,
) -> ApiResult<Json<Value>> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing session_id".to_string()))?;

    match state.payments.retrieve_session(&session_id).await {
        Ok(session) => Ok(Json(json!({
            "email": session.customer_email(),
            "name": session.customer_name(),
            "status": session.payment_status,
        }))),
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Order status lookup failed");
            Ok(Json(json!({ "email": null })))
        }
    }
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(create_checkout))
        .route("/api/order-status", get(order_status))
}
