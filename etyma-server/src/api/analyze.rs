//! Name analysis endpoint

use crate::{ApiError, ApiResult, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use etyma_common::analysis::validate_name;
use etyma_common::NameAnalysis;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

/// Request body for POST /api/analyze
///
/// `name` is kept untyped so a non-string reports "Invalid name" rather
/// than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub name: Value,
}

/// POST /api/analyze
///
/// **Request:** `{"name": "Luna"}`
/// **Response:** the full analysis object
///
/// **Errors:**
/// - 400 `Invalid name`: missing, non-string, blank or longer than 50 characters
/// - 500 `Failed to analyze name`: model unavailable or unparseable reply
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<NameAnalysis>> {
    let invalid = || ApiError::BadRequest("Invalid name".to_string());
    let Json(request) = payload.map_err(|_| invalid())?;
    let raw = request.name.as_str().ok_or_else(invalid)?;
    let name = validate_name(raw).map_err(|_| invalid())?;

    match state.analysis.analyze_name(&name).await {
        Ok(mut analysis) => {
            if analysis.name.trim().is_empty() {
                analysis.name = name;
            }
            info!(name = %analysis.name, "Analysis complete");
            Ok(Json(analysis))
        }
        Err(e) => {
            error!(name = %name, error = %e, "Analysis error");
            state.record_error(format!("analysis: {}", e)).await;
            Err(ApiError::Internal("Failed to analyze name".to_string()))
        }
    }
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}
