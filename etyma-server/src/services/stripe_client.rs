//! Payment processor client
//!
//! Creates hosted checkout sessions and reads them back. The processor's
//! REST API takes form-encoded bodies with bracketed keys for nested
//! fields, e.g. `line_items[0][price_data][currency]=gbp`.

use etyma_common::config::StripeConfig;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const USER_AGENT: &str = concat!("Etyma/", env!("CARGO_PKG_VERSION"));

/// Event type that triggers fulfilment
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Payment processor errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment processor secret key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    /// Status code and the processor's error message
    #[error("{1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid checkout session id")]
    InvalidSessionId,
}

/// Checkout session ids are `cs_` followed by ASCII letters, digits and `_`
pub fn is_valid_session_id(id: &str) -> bool {
    id.strip_prefix("cs_").is_some_and(|rest| {
        !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

/// What the checkout page is selling
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_id: Uuid,
    pub customer_name: String,
}

/// Checkout session as returned by the API or embedded in an event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSession {
    pub fn order_id(&self) -> Option<&str> {
        self.metadata
            .get("orderId")
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.metadata.get("customerName").map(String::as_str)
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()?
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
    }
}

/// Webhook event envelope
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl WebhookEvent {
    /// The completed checkout session, for `checkout.session.completed` only
    pub fn completed_session(&self) -> Option<Result<CheckoutSession, serde_json::Error>> {
        (self.event_type == CHECKOUT_COMPLETED)
            .then(|| serde_json::from_value(self.data.object.clone()))
    }
}

/// Build the form body for a checkout session
pub fn checkout_form_params(
    request: &CheckoutRequest,
    config: &StripeConfig,
    public_url: &str,
) -> Vec<(String, String)> {
    let origin = public_url.trim_end_matches('/');
    let item = |key: &str| format!("line_items[0][{}]", key);

    vec![
        ("mode".to_string(), "payment".to_string()),
        (item("price_data][currency"), config.currency.clone()),
        (
            item("price_data][product_data][name"),
            config.product_name.clone(),
        ),
        (
            item("price_data][product_data][description"),
            format!(
                "Custom name analysis poster for \"{}\"",
                request.customer_name
            ),
        ),
        (
            item("price_data][unit_amount"),
            config.unit_amount.to_string(),
        ),
        (item("quantity"), "1".to_string()),
        ("metadata[orderId]".to_string(), request.order_id.to_string()),
        (
            "metadata[customerName]".to_string(),
            request.customer_name.clone(),
        ),
        (
            "success_url".to_string(),
            format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", origin),
        ),
        ("cancel_url".to_string(), format!("{}/create", origin)),
    ]
}

/// Payment processor API client
pub struct StripeClient {
    http_client: reqwest::Client,
    config: StripeConfig,
    base_url: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config: config.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn secret_key(&self) -> Result<&str, PaymentError> {
        self.config
            .secret_key
            .as_deref()
            .ok_or(PaymentError::MissingApiKey)
    }

    /// Create a hosted checkout session for a stored order
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        public_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let params = checkout_form_params(request, &self.config, public_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.secret_key()?)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let session = parse_response(response).await?;
        tracing::info!(
            order_id = %request.order_id,
            session_id = %session.id,
            "Created checkout session"
        );
        Ok(session)
    }

    /// Fetch a checkout session by id
    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        if !is_valid_session_id(session_id) {
            return Err(PaymentError::InvalidSessionId);
        }
        let url = format!("{}/v1/checkout/sessions/{}", self.base_url, session_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.secret_key()?)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        parse_response(response).await
    }
}

async fn parse_response(response: reqwest::Response) -> Result<CheckoutSession, PaymentError> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| PaymentError::ParseError(e.to_string()))?;

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("payment processor request failed")
            .to_string();
        return Err(PaymentError::ApiError(status.as_u16(), message));
    }

    serde_json::from_value(body).map_err(|e| PaymentError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> HashMap<String, String> {
        let request = CheckoutRequest {
            order_id: Uuid::nil(),
            customer_name: "Willow".to_string(),
        };
        checkout_form_params(&request, &StripeConfig::default(), "https://etyma.art/")
            .into_iter()
            .collect()
    }

    #[test]
    fn test_checkout_form_params() {
        let params = params();
        assert_eq!(params["mode"], "payment");
        assert_eq!(params["line_items[0][price_data][currency]"], "gbp");
        assert_eq!(params["line_items[0][price_data][unit_amount]"], "2500");
        assert_eq!(
            params["line_items[0][price_data][product_data][name]"],
            "Etyma Digital Print"
        );
        assert_eq!(
            params["line_items[0][price_data][product_data][description]"],
            "Custom name analysis poster for \"Willow\""
        );
        assert_eq!(params["line_items[0][quantity]"], "1");
        assert_eq!(
            params["metadata[orderId]"],
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(params["metadata[customerName]"], "Willow");
        assert_eq!(
            params["success_url"],
            "https://etyma.art/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(params["cancel_url"], "https://etyma.art/create");
    }

    #[test]
    fn test_session_accessors() {
        let session: CheckoutSession = serde_json::from_value(json!({
            "id": "cs_test_1",
            "payment_status": "paid",
            "metadata": {"orderId": "abc", "customerName": "Iris"},
            "customer_details": {"email": "iris@example.com"}
        }))
        .unwrap();
        assert_eq!(session.order_id(), Some("abc"));
        assert_eq!(session.customer_name(), Some("Iris"));
        assert_eq!(session.customer_email(), Some("iris@example.com"));

        let bare: CheckoutSession =
            serde_json::from_value(json!({"id": "cs_test_2", "customer_details": null})).unwrap();
        assert_eq!(bare.order_id(), None);
        assert_eq!(bare.customer_email(), None);
    }

    #[test]
    fn test_completed_session_only_for_checkout_events() {
        let event: WebhookEvent = serde_json::from_value(json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {"id": "cs_1", "metadata": {"orderId": "o1"}}}
        }))
        .unwrap();
        let session = event.completed_session().unwrap().unwrap();
        assert_eq!(session.order_id(), Some("o1"));

        let other: WebhookEvent = serde_json::from_value(json!({
            "id": "evt_2",
            "type": "payment_intent.created",
            "data": {"object": {}}
        }))
        .unwrap();
        assert!(other.completed_session().is_none());
    }

    #[test]
    fn test_session_id_shape() {
        assert!(is_valid_session_id("cs_test_abc123"));
        assert!(is_valid_session_id("cs_live_A1b2"));
        assert!(!is_valid_session_id("cs_"));
        assert!(!is_valid_session_id("pi_123"));
        assert!(!is_valid_session_id("../../customers/cus_1?expand[]=x"));
        assert!(!is_valid_session_id("cs_1/../../customers/cus_1"));
        assert!(!is_valid_session_id("cs_1%2F.."));
    }

    #[tokio::test]
    async fn test_path_traversal_session_id_is_not_sent() {
        let config = StripeConfig {
            secret_key: Some("sk_test_1".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = StripeClient::new(&config).unwrap();
        let result = client
            .retrieve_session("../../customers/cus_1?expand[]=x")
            .await;
        assert!(matches!(result, Err(PaymentError::InvalidSessionId)));
    }

    #[tokio::test]
    async fn test_missing_secret_key() {
        let client = StripeClient::new(&StripeConfig::default()).unwrap();
        let result = client.retrieve_session("cs_1").await;
        assert!(matches!(result, Err(PaymentError::MissingApiKey)));
    }
}
