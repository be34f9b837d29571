//! UI Routes - HTML pages for the Etyma web interface
//!
//! Vanilla HTML/CSS/JS, embedded at compile time.
//!
//! # Structure
//! - **Pages** (`pages`): landing, create wizard, gallery, checkout success
//! - **Static Assets** (`static_assets`): CSS/JS file serving

use crate::AppState;
use axum::{routing::get, Router};

mod pages;
mod static_assets;

use pages::{create_page, gallery_page, root_page, success_page};
use static_assets::{
    serve_create_js, serve_etyma_css, serve_etyma_poster_js, serve_gallery_js, serve_success_js,
};

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        // Page routes
        .route("/", get(root_page))
        .route("/create", get(create_page))
        .route("/gallery", get(gallery_page))
        .route("/success", get(success_page))
        // Static assets
        .route("/static/etyma.css", get(serve_etyma_css))
        .route("/static/etyma-poster.js", get(serve_etyma_poster_js))
        .route("/static/create.js", get(serve_create_js))
        .route("/static/gallery.js", get(serve_gallery_js))
        .route("/static/success.js", get(serve_success_js))
}
