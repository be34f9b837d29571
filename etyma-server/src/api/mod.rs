//! HTTP API handlers
//!
//! JSON endpoints under `/api`, the payment webhook, health, and the
//! server-rendered pages of the browser wizard.

pub mod analyze;
pub mod art;
pub mod checkout;
pub mod gallery;
pub mod health;
pub mod leads;
pub mod orders;
pub mod pdf;
pub mod ui;
pub mod webhook;

pub use analyze::analyze_routes;
pub use art::art_routes;
pub use checkout::checkout_routes;
pub use gallery::gallery_routes;
pub use health::health_routes;
pub use leads::lead_routes;
pub use orders::order_routes;
pub use pdf::pdf_routes;
pub use ui::ui_routes;
pub use webhook::webhook_routes;
