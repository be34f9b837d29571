//! Order creation endpoint
//!
//! Stores everything the webhook will need, so the payment processor only
//! has to carry the order id through checkout.

use crate::services::OrderDraft;
use crate::{ApiError, ApiResult, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use etyma_common::{ColourPalette, NameAnalysis};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Request body for POST /api/order
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub name: Option<String>,
    pub analysis: Option<NameAnalysis>,
    pub palette: Option<String>,
    pub art_url: Option<String>,
    pub imagery_style: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateOrderRequest {
    /// Validate into a storable draft
    pub fn into_draft(self) -> ApiResult<OrderDraft> {
        let missing = || ApiError::BadRequest("Missing required fields".to_string());
        let name = non_blank(self.name).ok_or_else(missing)?;
        let analysis = self.analysis.ok_or_else(missing)?;
        let palette: ColourPalette = non_blank(self.palette).ok_or_else(missing)?.parse()?;

        Ok(OrderDraft {
            name,
            analysis,
            palette,
            art_url: non_blank(self.art_url),
            imagery_style: non_blank(self.imagery_style),
        })
    }
}

/// POST /api/order
///
/// **Request:** `{name, analysis, palette, artUrl?, imageryStyle?}`
/// **Response:** `{orderId}`
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<Json<CreateOrderResponse>> {
    let Json(request) =
        payload.map_err(|_| ApiError::BadRequest("Missing required fields".to_string()))?;
    let draft = request.into_draft()?;

    let name = draft.name.clone();
    let palette = draft.palette;
    let has_art = draft.art_url.is_some();
    let order_id = state.orders.insert(draft).await;

    info!(order_id = %order_id, name = %name, palette = %palette, has_art, "Order stored");
    Ok(Json(CreateOrderResponse { order_id }))
}

pub fn order_routes() -> Router<AppState> {
    Router::new().route("/api/order", post(create_order))
}
