//! Sample gallery and design tables
//!
//! Gallery analyses are bundled at compile time from `data/gallery/`.

use crate::AppState;
use axum::{routing::get, Json, Router};
use etyma_common::{ArtStyle, ColourPalette, NameAnalysis};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::warn;

const GALLERY_SOURCES: [(&str, &str); 8] = [
    ("sunny", include_str!("../../data/gallery/sunny.json")),
    ("auri", include_str!("../../data/gallery/auri.json")),
    ("luna", include_str!("../../data/gallery/luna.json")),
    ("oliver", include_str!("../../data/gallery/oliver.json")),
    ("alexander", include_str!("../../data/gallery/alexander.json")),
    ("iris", include_str!("../../data/gallery/iris.json")),
    ("felix", include_str!("../../data/gallery/felix.json")),
    ("willow", include_str!("../../data/gallery/willow.json")),
];

/// One sample poster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub palette: ColourPalette,
    pub analysis: NameAnalysis,
}

/// Parsed gallery, in display order
pub fn gallery_entries() -> &'static [GalleryEntry] {
    static ENTRIES: OnceLock<Vec<GalleryEntry>> = OnceLock::new();
    ENTRIES.get_or_init(|| {
        GALLERY_SOURCES
            .iter()
            .filter_map(|(id, source)| match serde_json::from_str(source) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(entry = %id, error = %e, "Skipping malformed gallery entry");
                    None
                }
            })
            .collect()
    })
}

/// GET /api/gallery
pub async fn gallery() -> Json<&'static [GalleryEntry]> {
    Json(gallery_entries())
}

/// GET /api/palettes
pub async fn palettes() -> Json<Value> {
    let table: Vec<Value> = ColourPalette::ALL
        .iter()
        .map(|palette| {
            let spec = palette.spec();
            json!({
                "id": palette.id(),
                "name": spec.name,
                "colors": spec.colors,
                "bg": spec.bg,
                "text": spec.text,
                "accent": spec.accent,
                "dark": palette.is_dark(),
            })
        })
        .collect();
    Json(Value::Array(table))
}

/// GET /api/styles
pub async fn styles() -> Json<Value> {
    let table: Vec<Value> = ArtStyle::ALL
        .iter()
        .map(|style| {
            json!({
                "id": style.id(),
                "name": style.display_name(),
                "description": style.description(),
            })
        })
        .collect();
    Json(Value::Array(table))
}

pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/api/gallery", get(gallery))
        .route("/api/palettes", get(palettes))
        .route("/api/styles", get(styles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_gallery_parses() {
        let entries = gallery_entries();
        assert_eq!(entries.len(), GALLERY_SOURCES.len());
        for entry in entries {
            assert!(!entry.analysis.name.is_empty());
            assert!(!entry.analysis.etymology.meaning.is_empty());
            assert!(!entry.analysis.morphology.morphemes.is_empty());
        }
    }
}
