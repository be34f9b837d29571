//! Language model client for name analysis
//!
//! Sends one chat-completion request per name and parses the JSON object
//! the model returns into [`NameAnalysis`].

use etyma_common::config::OpenAiConfig;
use etyma_common::NameAnalysis;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("Etyma/", env!("CARGO_PKG_VERSION"));

/// Instructions describing the analysis schema
const SYSTEM_PROMPT: &str = r#"You are a world-class linguist, etymologist, and phonetician. Given a name, produce a comprehensive linguistic analysis in JSON. Be accurate and scholarly, but also poetic and engaging. Never use em dashes; use commas or full stops instead.

The "meaning" field should be the most positive, aspirational reading of the name's etymology. Every name has beauty in its roots, so frame meanings warmly: "to follow" becomes "one who walks their own path", "battle" becomes "strength and resilience".

Return exactly this JSON structure:
{
  "name": "the name as given",
  "etymology": {
    "originLanguage": "primary language of origin",
    "rootWord": "the proto or root form (e.g. *sh₂wen-)",
    "rootMeaning": "what the root meant (e.g. to shine)",
    "meaning": "core meaning as a name (5-10 words)",
    "age": "approximate age (e.g. 5,000+ years old)",
    "languageFamilyTree": ["Proto-Indo-European *root", "Proto-Germanic *form", "Old English form", "Middle English form", "modern form"],
    "culturalSignificance": "2-3 sentences, scholarly but accessible",
    "historicalNotes": "1-2 sentences about stability or evolution of this word"
  },
  "phonetics": {
    "ipa": "/IPA transcription/",
    "sounds": [{"symbol": "/phoneme/", "type": "articulatory type", "description": "one poetic sentence about how this sound feels"}],
    "stressPattern": "e.g. STRONG-weak or da-DA",
    "stressType": "e.g. Trochee or Iamb",
    "stressDescription": "1-2 sentences about what this rhythm feels like",
    "rhythm": "how the name flows when spoken",
    "mouthJourney": "the mouth's journey as a chain (e.g. hiss → open warmth → hum → bright release)",
    "phonosemantic": "what the overall sound profile suggests emotionally"
  },
  "morphology": {
    "morphemes": [{"part": "morpheme", "type": "root/prefix/suffix", "meaning": "brief meaning in quotes"}],
    "wordClass": "original word class",
    "grammaticalJourney": "2 poetic sentences about what the morphemes say together",
    "relatedForms": ["variant1", "variant2", "variant3", "variant4"]
  },
  "phonaesthesia": [{"symbol": "/phoneme/", "line1": "2-3 word concept", "line2": "2-3 word poetic expansion"}],
  "semanticWeb": {
    "associations": ["word1", "word2", "word3", "word4", "word5", "word6"],
    "coreValues": "3-5 words separated by middots (e.g. life · growth · hope)"
  },
  "emotionalRegister": {
    "weather": "what this name feels like as weather, one sentence",
    "personality": "what this name feels like as a personality, one sentence",
    "asName": "what this name means when given to a child, one sentence"
  },
  "summaryQuote": "a beautiful 1-2 sentence poetic summary, no em dashes",
  "crossLinguistic": {
    "cognates": [{"language": "lang", "word": "cognate word"}],
    "famousBearers": ["Name1 (brief)", "Name2 (brief)"]
  }
}

The phonaesthesia array must have one entry per phoneme in the sounds array."#;

/// Language model client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Empty response from language model")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Chat-completion client for the analysis model
pub struct AnalysisClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request a full analysis for an already-validated name
    pub async fn analyze_name(&self, name: &str) -> Result<NameAnalysis, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(name = %name, model = %self.model, "Requesting name analysis");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(name))
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(status.as_u16(), error_text));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let analysis = parse_completion(completion)?;

        tracing::info!(
            name = %name,
            origin = %analysis.etymology.origin_language,
            "Received name analysis"
        );

        Ok(analysis)
    }

    fn request_body(&self, name: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Analyze the name: \"{}\"", name) },
            ],
        })
    }
}

fn parse_completion(completion: CompletionResponse) -> Result<NameAnalysis, LlmError> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)?;

    NameAnalysis::from_json(&content).map_err(|e| LlmError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(content: Option<&str>) -> CompletionResponse {
        CompletionResponse {
            choices: vec![CompletionChoice {
                message: CompletionMessage {
                    content: content.map(str::to_string),
                },
            }],
        }
    }

    #[test]
    fn test_parse_completion() {
        let analysis = parse_completion(completion(Some(
            r#"{"name": "Felix", "etymology": {"originLanguage": "Latin", "meaning": "lucky"}}"#,
        )))
        .unwrap();
        assert_eq!(analysis.name, "Felix");
        assert_eq!(analysis.etymology.origin_language, "Latin");
    }

    #[test]
    fn test_empty_completion() {
        assert!(matches!(
            parse_completion(completion(None)),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_completion(completion(Some("  "))),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_completion(CompletionResponse { choices: vec![] }),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_unparseable_completion() {
        assert!(matches!(
            parse_completion(completion(Some("not json"))),
            Err(LlmError::ParseError(_))
        ));
    }

    #[test]
    fn test_request_body() {
        let client = AnalysisClient::new(&OpenAiConfig::default()).unwrap();
        let body = client.request_body("Iris");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][1]["content"], "Analyze the name: \"Iris\"");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = AnalysisClient::new(&OpenAiConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.analyze_name("Iris").await,
            Err(LlmError::MissingApiKey)
        ));
    }
}
