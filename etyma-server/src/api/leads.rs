//! Lead capture: waitlist sign-ups and name requests
//!
//! Both append a row to the shared spreadsheet through the relay.

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

const WAITLIST_RANGE: &str = "Waitlist!A:C";
const REQUEST_RANGE: &str = "Name Requests!A:D";
const SOURCE: &str = "website";

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WaitlistRequest {
    pub email: Option<String>,
}

/// POST /api/waitlist
pub async fn join_waitlist(
    State(state): State<AppState>,
    payload: Result<Json<WaitlistRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let email = payload
        .ok()
        .and_then(|Json(body)| required(body.email))
        .ok_or_else(|| ApiError::BadRequest("Email required".to_string()))?;

    state
        .relay
        .append_row(WAITLIST_RANGE, vec![email.clone(), timestamp(), SOURCE.to_string()])
        .await
        .map_err(|e| {
            error!(email = %email, error = %e, "Waitlist error");
            ApiError::Internal("Failed".to_string())
        })?;

    info!(email = %email, "Waitlist sign-up");
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// POST /api/request
pub async fn request_name(
    State(state): State<AppState>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let name = required(body.name).ok_or_else(|| ApiError::BadRequest("Name required".to_string()))?;
    let email = required(body.email).unwrap_or_default();

    state
        .relay
        .append_row(
            REQUEST_RANGE,
            vec![name.clone(), email, timestamp(), SOURCE.to_string()],
        )
        .await
        .map_err(|e| {
            error!(name = %name, error = %e, "Name request error");
            ApiError::Internal("Failed".to_string())
        })?;

    info!(name = %name, "Name requested");
    Ok(Json(json!({ "ok": true })))
}

pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/api/waitlist", post(join_waitlist))
        .route("/api/request", post(request_name))
}
