//! Page handlers

use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../../static/index.html");
const CREATE_HTML: &str = include_str!("../../../static/create.html");
const GALLERY_HTML: &str = include_str!("../../../static/gallery.html");
const SUCCESS_HTML: &str = include_str!("../../../static/success.html");

/// GET /
///
/// Landing page with waitlist and name request forms
pub async fn root_page() -> impl IntoResponse {
    let version = format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));
    Html(INDEX_HTML.replace("{{VERSION}}", &version))
}

/// GET /create
///
/// Step-by-step wizard from name entry to checkout
pub async fn create_page() -> impl IntoResponse {
    Html(CREATE_HTML)
}

/// GET /gallery
pub async fn gallery_page() -> impl IntoResponse {
    Html(GALLERY_HTML)
}

/// GET /success
///
/// Checkout return page; looks up the session named in `?session_id=`
pub async fn success_page() -> impl IntoResponse {
    Html(SUCCESS_HTML)
}
