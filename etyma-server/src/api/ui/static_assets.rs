//! Static asset handlers
//!
//! Embeds and serves CSS/JS files at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const ETYMA_CSS: &str = include_str!("../../../static/etyma.css");
const ETYMA_POSTER_JS: &str = include_str!("../../../static/etyma-poster.js");
const CREATE_JS: &str = include_str!("../../../static/create.js");
const GALLERY_JS: &str = include_str!("../../../static/gallery.js");
const SUCCESS_JS: &str = include_str!("../../../static/success.js");

fn asset(content_type: &'static str, body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", content_type),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        body,
    )
        .into_response()
}

/// GET /static/etyma.css
pub async fn serve_etyma_css() -> Response {
    asset("text/css", ETYMA_CSS)
}

/// GET /static/etyma-poster.js
///
/// Poster preview shared by the create wizard and the gallery
pub async fn serve_etyma_poster_js() -> Response {
    asset("application/javascript", ETYMA_POSTER_JS)
}

/// GET /static/create.js
pub async fn serve_create_js() -> Response {
    asset("application/javascript", CREATE_JS)
}

/// GET /static/gallery.js
pub async fn serve_gallery_js() -> Response {
    asset("application/javascript", GALLERY_JS)
}

/// GET /static/success.js
pub async fn serve_success_js() -> Response {
    asset("application/javascript", SUCCESS_JS)
}
