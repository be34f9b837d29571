//! Poster PDF rendering

pub mod image;
pub mod metrics;
pub mod poster;
pub mod writer;

use thiserror::Error;

pub use image::EmbeddedImage;
pub use poster::{poster_filename, render_poster};

/// PDF rendering errors
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Malformed image: {0}")]
    MalformedImage(String),

    #[error("Palette error: {0}")]
    Palette(#[from] etyma_common::Error),
}
