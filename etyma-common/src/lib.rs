//! # Etyma Common Library
//!
//! Shared code for the Etyma service and its command-line tools:
//! - Name analysis types (the language model's fixed JSON schema)
//! - Colour palette and art style tables
//! - Configuration loading
//! - Common error type

pub mod analysis;
pub mod config;
pub mod error;
pub mod palette;

pub use analysis::NameAnalysis;
pub use error::{Error, Result};
pub use palette::{ArtStyle, ColourPalette, Rgb};
