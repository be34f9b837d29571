//! Upstream clients and the business logic built on them

pub mod art_client;
pub mod delivery_email;
pub mod fulfillment;
pub mod llm_client;
pub mod order_store;
pub mod relay_client;
pub mod stripe_client;
pub mod webhook_signature;

pub use art_client::{ArtClient, ArtError, ArtRequest, ArtStatus, ArtTask};
pub use fulfillment::{
    render_poster_pdf, DeliveryError, FulfillmentError, FulfillmentOutcome, FulfillmentService,
};
pub use llm_client::{AnalysisClient, LlmError};
pub use order_store::{OrderDraft, OrderStore, StoredOrder};
pub use relay_client::{RelayClient, RelayError};
pub use stripe_client::{CheckoutRequest, PaymentError, StripeClient};
