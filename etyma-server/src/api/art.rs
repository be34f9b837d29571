//! Artwork generation endpoints
//!
//! Generation is asynchronous at the provider: the browser submits a job,
//! then polls its status every few seconds until an image URL appears.

use crate::services::{ArtError, ArtRequest, ArtStatus, ArtTask};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, warn};

/// POST /api/generate-art
///
/// **Request:** `{name, meaning, palette?, imagery, etymology?, morphology?, emotionalRegister?}`
/// **Response:** `{taskId, provider}`
pub async fn generate_art(
    State(state): State<AppState>,
    payload: Result<Json<ArtRequest>, JsonRejection>,
) -> ApiResult<Json<ArtTask>> {
    let Json(request) = payload.map_err(|_| ApiError::BadRequest("Missing fields".to_string()))?;
    if !request.is_complete() {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    }

    state.art.submit(&request).await.map(Json).map_err(|e| {
        error!(name = %request.name, error = %e, "Art generation error");
        match e {
            ArtError::Rejected(_) => ApiError::Internal("Generation failed".to_string()),
            _ => ApiError::Internal("Failed".to_string()),
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct ArtStatusQuery {
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

/// GET /api/art-status?taskId=
///
/// Lookup failures report `pending` so the browser keeps polling.
pub async fn art_status(
    State(state): State<AppState>,
    Query(query): Query<ArtStatusQuery>,
) -> ApiResult<Json<ArtStatus>> {
    let task_id = query
        .task_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("taskId required".to_string()))?;

    match state.art.status(&task_id).await {
        Ok(status) => Ok(Json(status)),
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Art status check failed");
            Ok(Json(ArtStatus::Pending))
        }
    }
}

pub fn art_routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate-art", post(generate_art))
        .route("/api/art-status", get(art_status))
}
