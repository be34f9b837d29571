//! Image generation client
//!
//! Artwork is produced asynchronously by a hosted FLUX Kontext endpoint: a
//! submit call returns a task id, and the task is polled until it reports
//! success or failure. Older tasks may only be visible through the
//! provider's unified jobs endpoint, so status checks fall back to it.

use etyma_common::config::ArtConfig;
use etyma_common::{ArtStyle, ColourPalette};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("Etyma/", env!("CARGO_PKG_VERSION"));
const FLUX_MODEL: &str = "flux-kontext-pro";
const ASPECT_RATIO: &str = "3:4";

/// Image provider errors
#[derive(Debug, Error)]
pub enum ArtError {
    #[error("Image provider API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Generation rejected: {0}")]
    Rejected(String),

    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Task still pending after {0} polls")]
    Timeout(u32),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Artwork URL not allowed: {0}")]
    DisallowedUrl(String),

    #[error("Artwork larger than {0} bytes")]
    TooLarge(u64),
}

/// Art generation request, as posted by the wizard
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtRequest {
    pub name: String,
    pub meaning: String,
    pub palette: Option<String>,
    pub imagery: String,
    pub etymology: Option<Value>,
    pub morphology: Option<Value>,
    pub emotional_register: Option<Value>,
}

impl ArtRequest {
    /// Name, meaning and style are all required
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.meaning.trim().is_empty()
            && !self.imagery.trim().is_empty()
    }
}

/// Submitted generation task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtTask {
    pub task_id: String,
    pub provider: String,
}

/// Progress of a generation task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ArtStatus {
    Pending,
    Complete {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Compose the text-to-image prompt for a name
pub fn build_prompt(request: &ArtRequest) -> String {
    let style = ArtStyle::from_id_lossy(&request.imagery);
    let palette = ColourPalette::from_id_lossy(request.palette.as_deref().unwrap_or_default());
    let name = request.name.trim();
    let meaning = request.meaning.trim();

    let background = if palette.is_dark() {
        "The background must be very dark, near-black. All elements fade into darkness at the edges."
    } else {
        "The background must be pure white or very light cream. All elements fade into white at the edges."
    };

    let mut context = Vec::new();
    if let Some(origin) = field(&request.etymology, &["origin", "originLanguage"]) {
        let root_meaning = field(&request.etymology, &["rootMeaning"]).unwrap_or(meaning);
        context.push(format!(
            "The name comes from {} meaning \"{}\".",
            origin, root_meaning
        ));
    }
    if let Some(root) = field(&request.morphology, &["root"]).or_else(|| first_morpheme(&request.morphology)) {
        let root_meaning = field(&request.morphology, &["rootMeaning"]).unwrap_or(meaning);
        context.push(format!(
            "Its root \"{}\" carries the essence of {}.",
            root, root_meaning
        ));
    }
    if let Some(weather) = field(&request.emotional_register, &["weather"]) {
        context.push(format!(
            "It evokes the feeling of {}.",
            weather.to_lowercase()
        ));
    }

    format!(
        "Create a breathtaking piece of art for the name \"{name}\".\n\n\
         This name means \"{meaning}\". {context}\n\n\
         The artwork must visually represent what \"{name}\" means and feels like. \
         Not the letters of the name, but its soul and essence. \
         What would \"{meaning}\" look like if you could paint it?\n\n\
         {render}, {world}.\n\n\
         Composition: A single powerful central motif in the upper-centre of the frame. \
         The imagery naturally dissolves and fades toward the edges, especially the bottom half. \
         Museum-quality fine art print. Emotional, evocative, deeply meaningful.\n\n\
         {background}\n\n\
         CRITICAL: Absolutely NO text, NO words, NO letters, NO numbers, NO typography of any kind anywhere in the image.",
        name = name,
        meaning = meaning,
        context = context.join(" "),
        render = style.render_phrase(),
        world = palette.world(),
        background = background,
    )
}

fn field<'a>(section: &'a Option<Value>, keys: &[&str]) -> Option<&'a str> {
    let section = section.as_ref()?;
    keys.iter()
        .filter_map(|key| section.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn first_morpheme(morphology: &Option<Value>) -> Option<&str> {
    morphology
        .as_ref()?
        .get("morphemes")?
        .get(0)?
        .get("part")?
        .as_str()
        .filter(|part| !part.trim().is_empty())
}

/// Interpret a FLUX record (`data` of the record-info response)
///
/// `successFlag` 1 is done, 2 and 3 are failures; anything else is unknown
/// and left to the jobs endpoint.
pub fn interpret_flux_record(record: &Value) -> Option<ArtStatus> {
    let flag = record.get("successFlag").and_then(Value::as_i64)?;
    match flag {
        1 => record
            .get("response")
            .and_then(|r| r.get("resultImageUrl"))
            .and_then(Value::as_str)
            .map(|url| ArtStatus::Complete {
                image_url: url.to_string(),
            }),
        2 | 3 => Some(ArtStatus::Failed {
            error: record
                .get("errorMessage")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        _ => None,
    }
}

/// Interpret a unified jobs record (`data` of the recordInfo response)
///
/// `resultJson` arrives either as an embedded JSON string or an object.
pub fn interpret_job_record(record: &Value) -> Option<ArtStatus> {
    match record.get("state").and_then(Value::as_str)? {
        "success" => {
            let result = match record.get("resultJson")? {
                Value::String(text) => match serde_json::from_str::<Value>(text) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!(error = %e, "Unparseable resultJson in job record");
                        return None;
                    }
                },
                other => other.clone(),
            };
            ["resultUrls", "output"]
                .iter()
                .find_map(|key| result.get(*key)?.get(0)?.as_str())
                .map(|url| ArtStatus::Complete {
                    image_url: url.to_string(),
                })
        }
        "fail" => Some(ArtStatus::Failed {
            error: record
                .get("failMsg")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        _ => None,
    }
}

/// Image generation API client
pub struct ArtClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    output_format: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    artwork_hosts: Vec<String>,
    max_image_bytes: u64,
}

impl ArtClient {
    pub fn new(config: &ArtConfig) -> Result<Self, ArtError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ArtError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            output_format: config.output_format.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
            artwork_hosts: config
                .artwork_hosts
                .iter()
                .map(|host| host.to_ascii_lowercase())
                .collect(),
            max_image_bytes: config.max_image_bytes,
        })
    }

    fn api_key(&self) -> Result<&str, ArtError> {
        self.api_key.as_deref().ok_or(ArtError::MissingApiKey)
    }

    /// Submit a generation task
    pub async fn submit(&self, request: &ArtRequest) -> Result<ArtTask, ArtError> {
        let api_key = self.api_key()?;
        let url = format!("{}/api/v1/flux/kontext/generate", self.base_url);
        let body = json!({
            "prompt": build_prompt(request),
            "aspectRatio": ASPECT_RATIO,
            "outputFormat": self.output_format,
            "model": FLUX_MODEL,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ArtError::NetworkError(e.to_string()))?;

        let status = response.status();
        let data: Value = response
            .json()
            .await
            .map_err(|e| ArtError::ParseError(e.to_string()))?;

        tracing::info!(
            status = status.as_u16(),
            code = ?data.get("code"),
            task_id = ?data.pointer("/data/taskId"),
            "Art generation submitted"
        );

        match data.pointer("/data/taskId").and_then(Value::as_str) {
            Some(task_id) => Ok(ArtTask {
                task_id: task_id.to_string(),
                provider: "flux".to_string(),
            }),
            None => {
                let message = data
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or("no task id returned")
                    .to_string();
                tracing::error!(response = %data, "No taskId in generation response");
                Err(ArtError::Rejected(message))
            }
        }
    }

    /// Check a task once
    pub async fn status(&self, task_id: &str) -> Result<ArtStatus, ArtError> {
        let flux_url = format!(
            "{}/api/v1/flux/kontext/record-info?taskId={}",
            self.base_url, task_id
        );
        match self.fetch_record(&flux_url).await {
            Ok(record) => {
                if let Some(status) = interpret_flux_record(&record) {
                    return Ok(status);
                }
            }
            Err(e) => tracing::debug!(task_id = %task_id, error = %e, "FLUX record lookup failed"),
        }

        let jobs_url = format!(
            "{}/api/v1/jobs/recordInfo?taskId={}",
            self.base_url, task_id
        );
        let record = self.fetch_record(&jobs_url).await?;
        Ok(interpret_job_record(&record).unwrap_or(ArtStatus::Pending))
    }

    async fn fetch_record(&self, url: &str) -> Result<Value, ArtError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.api_key()?)
            .send()
            .await
            .map_err(|e| ArtError::NetworkError(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ArtError::ParseError(e.to_string()))?;

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Poll until the task completes, returning the image URL
    ///
    /// Transient lookup errors count as pending polls.
    pub async fn wait_for_completion(&self, task_id: &str) -> Result<String, ArtError> {
        for attempt in 1..=self.max_poll_attempts {
            match self.status(task_id).await {
                Ok(ArtStatus::Complete { image_url }) => {
                    tracing::info!(task_id = %task_id, attempt, "Artwork ready");
                    return Ok(image_url);
                }
                Ok(ArtStatus::Failed { error }) => {
                    return Err(ArtError::Failed(
                        error.unwrap_or_else(|| "provider reported failure".to_string()),
                    ));
                }
                Ok(ArtStatus::Pending) => {
                    tracing::debug!(task_id = %task_id, attempt, "Artwork pending");
                }
                Err(ArtError::MissingApiKey) => return Err(ArtError::MissingApiKey),
                Err(e) => {
                    tracing::warn!(task_id = %task_id, attempt, error = %e, "Status poll failed");
                }
            }
            if attempt < self.max_poll_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        Err(ArtError::Timeout(self.max_poll_attempts))
    }

    /// Check an artwork URL before anything is fetched
    ///
    /// Listed hosts are always allowed. With no list, only https URLs to
    /// hosts that are not loopback, private or link-local literals pass.
    pub fn check_artwork_url(&self, raw: &str) -> Result<reqwest::Url, ArtError> {
        let disallowed = || ArtError::DisallowedUrl(raw.to_string());
        let url = reqwest::Url::parse(raw).map_err(|_| disallowed())?;
        let host = url.host_str().ok_or_else(disallowed)?.to_ascii_lowercase();

        if !self.artwork_hosts.is_empty() {
            let listed = self.artwork_hosts.iter().any(|allowed| *allowed == host);
            let web = matches!(url.scheme(), "https" | "http");
            return if listed && web { Ok(url) } else { Err(disallowed()) };
        }

        if url.scheme() != "https" || is_internal_host(&host) {
            return Err(disallowed());
        }
        Ok(url)
    }

    /// Download finished artwork, refusing bodies over the size cap
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ArtError> {
        let url = self.check_artwork_url(url)?;
        let mut response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ArtError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtError::ApiError(
                status.as_u16(),
                format!("artwork download failed: {}", url),
            ));
        }

        let limit = self.max_image_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(ArtError::TooLarge(limit));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ArtError::NetworkError(e.to_string()))?
        {
            if (bytes.len() + chunk.len()) as u64 > limit {
                return Err(ArtError::TooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn is_internal_host(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    let literal = host.trim_start_matches('[').trim_end_matches(']');
    match literal.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            ip.is_loopback()
                || ip.is_private()
                || ip.is_link_local()
                || ip.is_unspecified()
                || ip.is_broadcast()
        }
        Ok(IpAddr::V6(ip)) => {
            let first = ip.segments()[0];
            ip.is_loopback()
                || ip.is_unspecified()
                // unique local fc00::/7 and link-local fe80::/10
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || ip.to_ipv4_mapped().is_some_and(|v4| {
                    v4.is_loopback() || v4.is_private() || v4.is_link_local()
                })
        }
        Err(_) => false,
    }
}
