//! Print fulfilment after payment
//!
//! Runs once per completed checkout: look up the stored order, render the
//! poster, and email it. Nothing here retries. Every path that leaves a
//! paid customer without a print logs an error event carrying
//! `manual_fulfilment = true` so it can be found and handled by hand.

use super::art_client::ArtClient;
use super::delivery_email::delivery_email;
use super::order_store::{OrderStore, StoredOrder};
use super::relay_client::{RelayClient, RelayError};
use super::stripe_client::WebhookEvent;
use crate::pdf::{render_poster, EmbeddedImage, PdfError};
use chrono::{Datelike, Utc};
use etyma_common::{ColourPalette, NameAnalysis};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Webhook payload lacks what fulfilment needs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FulfillmentError {
    #[error("Missing data")]
    MissingData,

    #[error("Malformed checkout session: {0}")]
    MalformedSession(String),
}

/// Delivery pipeline failures
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Render failed: {0}")]
    Render(#[from] PdfError),

    #[error("Render task failed: {0}")]
    Task(String),

    #[error("Email failed: {0}")]
    Email(#[from] RelayError),
}

/// What happened to a webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// Not a completed checkout
    Ignored,
    Delivered { order_id: Uuid },
    OrderNotFound,
    DeliveryFailed,
}

impl FulfillmentOutcome {
    /// Warning code reported back to the payment processor
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            FulfillmentOutcome::OrderNotFound => Some("order_not_found"),
            FulfillmentOutcome::DeliveryFailed => Some("delivery_failed"),
            _ => None,
        }
    }
}

/// Turns paid checkouts into delivered prints
pub struct FulfillmentService {
    orders: OrderStore,
    art: Arc<ArtClient>,
    relay: Arc<RelayClient>,
    site_url: String,
}

impl FulfillmentService {
    pub fn new(
        orders: OrderStore,
        art: Arc<ArtClient>,
        relay: Arc<RelayClient>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            art,
            relay,
            site_url: site_url.into(),
        }
    }

    /// Act on a verified webhook event
    pub async fn handle_event(
        &self,
        event: &WebhookEvent,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        let session = match event.completed_session() {
            None => {
                info!(event_id = %event.id, event_type = %event.event_type, "Webhook event ignored");
                return Ok(FulfillmentOutcome::Ignored);
            }
            Some(parsed) => parsed.map_err(|e| FulfillmentError::MalformedSession(e.to_string()))?,
        };

        let (order_id, email) = match (session.order_id(), session.customer_email()) {
            (Some(order_id), Some(email)) => (order_id.to_string(), email.to_string()),
            (order_id, email) => {
                error!(
                    session_id = %session.id,
                    order_id = ?order_id,
                    email = ?email,
                    "Missing orderId or email in webhook"
                );
                return Err(FulfillmentError::MissingData);
            }
        };

        // Claimed up front so a concurrent retry of the same event sees no order
        let order = match Uuid::parse_str(&order_id) {
            Ok(id) => self.orders.take(&id).await,
            Err(_) => None,
        };
        let Some(order) = order else {
            error!(
                manual_fulfilment = true,
                order_id = %order_id,
                email = %email,
                session_id = %session.id,
                "Order not found; manual fulfilment needed"
            );
            return Ok(FulfillmentOutcome::OrderNotFound);
        };

        match self.deliver(&order, &email).await {
            Ok(()) => {
                info!(order_id = %order.id, email = %email, "Order delivered");
                Ok(FulfillmentOutcome::Delivered { order_id: order.id })
            }
            Err(e) => {
                error!(
                    manual_fulfilment = true,
                    order_id = %order.id,
                    email = %email,
                    session_id = %session.id,
                    error = %e,
                    "Delivery failed; manual fulfilment needed"
                );
                self.orders.restore(order).await;
                Ok(FulfillmentOutcome::DeliveryFailed)
            }
        }
    }

    /// Render and email the poster for one order
    pub async fn deliver(&self, order: &StoredOrder, email: &str) -> Result<(), DeliveryError> {
        let draft = &order.draft;
        let pdf = render_poster_pdf(
            &self.art,
            &draft.analysis,
            draft.palette,
            draft.art_url.as_deref(),
        )
        .await?;

        let message = delivery_email(email, &draft.name, &draft.analysis, &pdf, &self.site_url);
        self.relay.send_email(&message).await?;
        Ok(())
    }
}

/// Render a poster, downloading its artwork first when there is any
///
/// Artwork problems are logged and the poster is rendered without art.
pub async fn render_poster_pdf(
    art: &ArtClient,
    analysis: &NameAnalysis,
    palette: ColourPalette,
    art_url: Option<&str>,
) -> Result<Vec<u8>, DeliveryError> {
    let artwork = match art_url {
        Some(url) => load_artwork(art, url).await,
        None => None,
    };

    let analysis = analysis.clone();
    let year = Utc::now().year();
    let pdf = tokio::task::spawn_blocking(move || render_poster(&analysis, palette, artwork, year))
        .await
        .map_err(|e| DeliveryError::Task(e.to_string()))??;
    Ok(pdf)
}

async fn load_artwork(art: &ArtClient, url: &str) -> Option<EmbeddedImage> {
    let bytes = match art.fetch_image(url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(url = %url, error = %e, "Artwork download failed, rendering without art");
            return None;
        }
    };
    match EmbeddedImage::from_bytes(bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(url = %url, error = %e, "Artwork not embeddable, rendering without art");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::order_store::OrderDraft;
    use etyma_common::config::{ArtConfig, RelayConfig};
    use serde_json::json;
    use std::time::Duration;

    fn service(store: OrderStore) -> FulfillmentService {
        FulfillmentService::new(
            store,
            Arc::new(ArtClient::new(&ArtConfig::default()).unwrap()),
            Arc::new(RelayClient::new(&RelayConfig::default()).unwrap()),
            "https://etyma.art",
        )
    }

    fn event(event_type: &str, object: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(json!({"id": "evt_1", "type": event_type, "data": {"object": object}}))
            .unwrap()
    }

    #[tokio::test]
    async fn test_other_events_ignored() {
        let service = service(OrderStore::new(Duration::from_secs(60)));
        let outcome = service
            .handle_event(&event("payment_intent.succeeded", json!({})))
            .await
            .unwrap();
        assert_eq!(outcome, FulfillmentOutcome::Ignored);
        assert_eq!(outcome.warning(), None);
    }

    #[tokio::test]
    async fn test_missing_email_is_rejected() {
        let service = service(OrderStore::new(Duration::from_secs(60)));
        let result = service
            .handle_event(&event(
                "checkout.session.completed",
                json!({"id": "cs_1", "metadata": {"orderId": "x"}}),
            ))
            .await;
        assert_eq!(result, Err(FulfillmentError::MissingData));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let service = service(OrderStore::new(Duration::from_secs(60)));
        let outcome = service
            .handle_event(&event(
                "checkout.session.completed",
                json!({
                    "id": "cs_1",
                    "metadata": {"orderId": Uuid::new_v4().to_string()},
                    "customer_details": {"email": "a@example.com"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(outcome, FulfillmentOutcome::OrderNotFound);
        assert_eq!(outcome.warning(), Some("order_not_found"));
    }

    #[tokio::test]
    async fn test_unconfigured_relay_keeps_order() {
        let store = OrderStore::new(Duration::from_secs(60));
        let id = store
            .insert(OrderDraft {
                name: "Luna".to_string(),
                analysis: NameAnalysis::default(),
                palette: ColourPalette::WarmGold,
                art_url: None,
                imagery_style: None,
            })
            .await;
        let service = service(store.clone());

        let outcome = service
            .handle_event(&event(
                "checkout.session.completed",
                json!({
                    "id": "cs_1",
                    "metadata": {"orderId": id.to_string()},
                    "customer_details": {"email": "a@example.com"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(outcome, FulfillmentOutcome::DeliveryFailed);
        assert_eq!(outcome.warning(), Some("delivery_failed"));
        assert!(store.get(&id).await.is_some());
    }
}
