//! Poster download endpoint

use crate::pdf::poster_filename;
use crate::services::render_poster_pdf;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use etyma_common::{ColourPalette, NameAnalysis};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    pub analysis: Option<NameAnalysis>,
    pub palette: Option<ColourPalette>,
    pub art_url: Option<String>,
}

/// POST /api/generate-pdf
///
/// **Request:** `{analysis, palette, artUrl?}`
/// **Response:** `application/pdf` attachment named `etyma-<name>.pdf`
pub async fn generate_pdf(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePdfRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let missing = || ApiError::BadRequest("Missing data".to_string());
    let Json(request) = payload.map_err(|_| missing())?;
    let analysis = request.analysis.ok_or_else(missing)?;
    let palette = request.palette.ok_or_else(missing)?;
    let art_url = request.art_url.filter(|url| !url.trim().is_empty());

    let pdf = render_poster_pdf(&state.art, &analysis, palette, art_url.as_deref())
        .await
        .map_err(|e| {
            error!(name = %analysis.name, error = %e, "PDF generation error");
            ApiError::Internal("PDF generation failed".to_string())
        })?;

    info!(name = %analysis.name, palette = %palette, bytes = pdf.len(), "Poster generated");
    let disposition = format!("attachment; filename=\"{}\"", poster_filename(&analysis.name));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

pub fn pdf_routes() -> Router<AppState> {
    Router::new().route("/api/generate-pdf", post(generate_pdf))
}
