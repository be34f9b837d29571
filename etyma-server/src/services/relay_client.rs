//! Email and spreadsheet relay client
//!
//! Delivery emails and lead capture both go through a hosted proxy that
//! fronts a mail account and a spreadsheet. Requests authenticate with an
//! `X-Api-Key` header.

use etyma_common::config::RelayConfig;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("Etyma/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "X-Api-Key";

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Relay API key not configured")]
    MissingApiKey,

    #[error("Spreadsheet not configured")]
    MissingSheet,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Relay error {0}: {1}")]
    ApiError(u16, String),
}

/// File attached to an outgoing email
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    /// Base64-encoded file contents
    pub content: String,
}

/// HTML email to send through the relay
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

/// Relay API client
pub struct RelayClient {
    http_client: reqwest::Client,
    config: RelayConfig,
    base_url: String,
}

impl RelayClient {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| RelayError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config: config.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, RelayError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingApiKey)
    }

    /// Send an HTML email
    pub async fn send_email(&self, email: &OutgoingEmail) -> Result<(), RelayError> {
        let url = format!("{}/gmail/send", self.base_url);
        let body = json!({
            "account": self.config.account,
            "to": email.to,
            "subject": email.subject,
            "body": email.html_body,
            "isHtml": true,
            "from": self.config.from,
            "attachments": email.attachments,
        });

        self.post(&url, &body).await?;
        tracing::debug!(to = %email.to, subject = %email.subject, "Email accepted by relay");
        Ok(())
    }

    /// Append one row to a range of the configured spreadsheet
    ///
    /// `range` uses sheet notation, e.g. `Waitlist!A:C`.
    pub async fn append_row(&self, range: &str, values: Vec<String>) -> Result<(), RelayError> {
        let sheet_id = self
            .config
            .sheet_id
            .as_deref()
            .ok_or(RelayError::MissingSheet)?;
        let url = format!(
            "{}/sheets/{}/values/{}/append?account={}",
            self.base_url,
            sheet_id,
            range.replace(' ', "%20"),
            self.config.account
        );

        self.post(&url, &json!({ "values": [values] })).await?;
        tracing::debug!(range = %range, "Row appended");
        Ok(())
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<(), RelayError> {
        let response = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RelayError::ApiError(status.as_u16(), error_text));
        }
        Ok(())
    }
}
