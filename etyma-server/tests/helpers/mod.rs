//! Shared test helpers
//!
//! One local axum server stands in for every upstream: the language model,
//! the image provider (and its artwork CDN), the payment processor and the
//! email/sheets relay. Requests it receives are recorded for assertions.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use etyma_common::config::TomlConfig;
use etyma_server::services::webhook_signature::signature_header;
use etyma_server::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

pub const WEBHOOK_SECRET: &str = "whsec_integration_test";
pub const SHEET_ID: &str = "sheet-test";
pub const CUSTOMER_EMAIL: &str = "reader@example.com";

const LUNA_ENTRY: &str = include_str!("../../data/gallery/luna.json");

/// Analysis the fake language model returns for every name
pub fn luna_analysis() -> Value {
    let entry: Value = serde_json::from_str(LUNA_ENTRY).unwrap();
    entry["analysis"].clone()
}

/// Minimal baseline JPEG header: SOI, JFIF, SOF0, EOI
pub fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    bytes.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[0x03, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// What the fake upstream has seen
#[derive(Clone)]
pub struct Recorded {
    base_url: String,
    pub emails: Arc<Mutex<Vec<Value>>>,
    pub rows: Arc<Mutex<Vec<(String, Value)>>>,
    pub checkouts: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub art_prompts: Arc<Mutex<Vec<Value>>>,
    /// Status the relay answers email sends with
    relay_status: Arc<AtomicU16>,
}

impl Recorded {
    pub fn emails(&self) -> Vec<Value> {
        self.emails.lock().unwrap().clone()
    }

    pub fn rows(&self) -> Vec<(String, Value)> {
        self.rows.lock().unwrap().clone()
    }

    pub fn checkouts(&self) -> Vec<HashMap<String, String>> {
        self.checkouts.lock().unwrap().clone()
    }

    pub fn fail_relay_with(&self, status: StatusCode) {
        self.relay_status.store(status.as_u16(), Ordering::SeqCst);
    }
}

/// Running fake upstream
pub struct FakeUpstream {
    pub base_url: String,
    pub recorded: Recorded,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let recorded = Recorded {
            base_url: base_url.clone(),
            emails: Arc::default(),
            rows: Arc::default(),
            checkouts: Arc::default(),
            art_prompts: Arc::default(),
            relay_status: Arc::new(AtomicU16::new(200)),
        };

        let app = Router::new()
            .route("/chat/completions", post(fake_completion))
            .route("/api/v1/flux/kontext/generate", post(fake_art_submit))
            .route("/api/v1/flux/kontext/record-info", get(fake_art_record))
            .route("/art/poster.jpg", get(fake_artwork))
            .route("/v1/checkout/sessions", post(fake_create_session))
            .route("/v1/checkout/sessions/:id", get(fake_retrieve_session))
            .route("/v1/customers/:id", get(fake_retrieve_customer))
            .route("/gmail/send", post(fake_send_email))
            .route("/sheets/:sheet/values/:range/append", post(fake_append_row))
            .with_state(recorded.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, recorded }
    }

    /// Config pointing every client at this server
    pub fn config(&self) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.server.public_url = "https://etyma.test".to_string();
        config.openai.api_key = Some("sk-test".to_string());
        config.openai.base_url = self.base_url.clone();
        config.art.api_key = Some("kie-test".to_string());
        config.art.base_url = self.base_url.clone();
        config.art.poll_interval_ms = 10;
        config.art.max_poll_attempts = 3;
        config.art.artwork_hosts = vec!["127.0.0.1".to_string()];
        config.stripe.secret_key = Some("sk_test_stripe".to_string());
        config.stripe.webhook_secret = Some(WEBHOOK_SECRET.to_string());
        config.stripe.base_url = self.base_url.clone();
        config.relay.api_key = Some("relay-test".to_string());
        config.relay.base_url = self.base_url.clone();
        config.relay.sheet_id = Some(SHEET_ID.to_string());
        config
    }

    pub fn state(&self) -> AppState {
        AppState::from_config(self.config()).unwrap()
    }

    pub fn artwork_url(&self) -> String {
        format!("{}/art/poster.jpg", self.base_url)
    }
}

/// State with no upstream credentials; nothing leaves the process
pub fn offline_state() -> AppState {
    AppState::from_config(TomlConfig::default()).unwrap()
}

async fn fake_completion(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({
        "choices": [{ "message": { "content": luna_analysis().to_string() } }]
    }))
}

async fn fake_art_submit(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.art_prompts.lock().unwrap().push(body);
    Json(json!({ "code": 200, "msg": "success", "data": { "taskId": "task-test-1" } }))
}

async fn fake_art_record(State(recorded): State<Recorded>) -> Json<Value> {
    Json(json!({
        "code": 200,
        "data": {
            "successFlag": 1,
            "response": { "resultImageUrl": format!("{}/art/poster.jpg", recorded.base_url) }
        }
    }))
}

async fn fake_artwork() -> Response {
    ([("content-type", "image/jpeg")], tiny_jpeg(64, 48)).into_response()
}

async fn fake_create_session(
    State(recorded): State<Recorded>,
    Form(params): Form<HashMap<String, String>>,
) -> Json<Value> {
    recorded.checkouts.lock().unwrap().push(params);
    Json(json!({
        "id": "cs_test_abc123",
        "url": "https://checkout.test/pay/cs_test_abc123"
    }))
}

async fn fake_retrieve_session(Path(id): Path<String>) -> Response {
    if id != "cs_test_abc123" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": "No such checkout.session" } })),
        )
            .into_response();
    }
    Json(json!({
        "id": id,
        "payment_status": "paid",
        "metadata": { "orderId": "ignored", "customerName": "Luna" },
        "customer_details": { "email": CUSTOMER_EMAIL }
    }))
    .into_response()
}

/// A non-session object whose fields must never reach `/api/order-status`
async fn fake_retrieve_customer(Path(id): Path<String>) -> Response {
    Json(json!({
        "id": id,
        "metadata": { "customerName": "leaked" },
        "customer_details": { "email": "leaked@example.com" }
    }))
    .into_response()
}

async fn fake_send_email(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    let status = StatusCode::from_u16(recorded.relay_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_success() {
        recorded.emails.lock().unwrap().push(body);
    }
    (status, Json(json!({}))).into_response()
}

async fn fake_append_row(
    State(recorded): State<Recorded>,
    Path((_sheet, range)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.rows.lock().unwrap().push((range, body["values"][0].clone()));
    Json(json!({}))
}

/// Checkout-completed event for an order
pub fn completed_event(order_id: &str, email: &str) -> Vec<u8> {
    json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_abc123",
                "payment_status": "paid",
                "metadata": { "orderId": order_id, "customerName": "Luna" },
                "customer_details": { "email": email }
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// Webhook request signed the way the payment processor signs it
pub fn signed_webhook(body: Vec<u8>) -> Request<Body> {
    let header = signature_header(&body, WEBHOOK_SECRET, Utc::now().timestamp()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/webhook")
        .header("content-type", "application/json")
        .header("stripe-signature", header)
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Order request for the bundled Luna analysis
pub fn luna_order(art_url: Option<&str>) -> Value {
    json!({
        "name": "Luna",
        "analysis": luna_analysis(),
        "palette": "cool-midnight",
        "artUrl": art_url,
        "imageryStyle": "celestial"
    })
}
