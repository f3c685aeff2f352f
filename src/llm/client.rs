//! Client for AI-backed structured extraction.
//!
//! Talks to an Anthropic-compatible messages API. Field values are
//! requested through a forced tool call so the answer comes back as a
//! single JSON object instead of free text.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::Schema;

/// Name of the forced tool the model must answer with.
const EXTRACTION_TOOL: &str = "record_fields";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Configuration for the extraction client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether AI extraction is enabled at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API endpoint base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for extraction.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; falls back to the ANTHROPIC_API_KEY environment
    /// variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Maximum tokens in the response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Maximum characters of document text to send.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Retries after a transient failure before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}
fn default_max_tokens() -> u32 {
    2500
}
fn default_max_content_chars() -> usize {
    50_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            max_content_chars: default_max_content_chars(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl LlmConfig {
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }

    /// True when the AI path can run at all.
    pub fn has_credentials(&self) -> bool {
        self.enabled && self.resolve_api_key().is_some()
    }
}

/// Errors that can occur during AI extraction.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("AI extraction is disabled")]
    Disabled,
}

impl LlmError {
    /// Transient failures are worth retrying; everything else
    /// downgrades straight to the fallback path.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Connection(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    tools: Vec<Value>,
    tool_choice: Value,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

/// Client for AI-backed field extraction.
pub struct LlmClient {
    config: LlmConfig,
    api_key: String,
    client: Client,
}

impl LlmClient {
    /// Create a client, or `None` when no credential is configured.
    pub fn from_config(config: LlmConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");
        Some(Self {
            config,
            api_key,
            client,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Extract one value per schema field from the document text.
    ///
    /// Transient failures are retried with exponential backoff up to
    /// the configured budget; the final error is returned for the
    /// caller to downgrade.
    pub async fn extract_fields(
        &self,
        text: &str,
        schema: &Schema,
    ) -> Result<BTreeMap<String, Option<String>>, LlmError> {
        let request = self.build_request(text, schema);

        let mut attempt: u32 = 0;
        loop {
            match self.call_messages(&request).await {
                Ok(response) => return parse_tool_response(&response, schema),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(
                        self.config.retry_base_delay_ms.saturating_mul(1 << attempt),
                    );
                    warn!(
                        "Transient extraction failure ({}), retry {}/{} in {:?}",
                        e,
                        attempt + 1,
                        self.config.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn build_request(&self, text: &str, schema: &Schema) -> MessagesRequest {
        let mut properties = serde_json::Map::new();
        for field in schema.fields() {
            properties.insert(
                field.name.to_string(),
                json!({ "type": ["string", "null"], "description": field.hint }),
            );
        }
        let tool = json!({
            "name": EXTRACTION_TOOL,
            "description": "Records structured fields extracted from the document.",
            "input_schema": {
                "type": "object",
                "properties": properties,
            },
        });

        let truncated = truncate_utf8(text, self.config.max_content_chars);
        let prompt = format!(
            "This is a {} document. You are a data extraction expert tasked with \
             extracting structured information from the following document.\n\n\
             <document>\n{}\n</document>\n\n\
             Extract all relevant information according to the provided schema. \
             If a field is not found in the document, use null.\n\
             For dates, format consistently (YYYY-MM-DD where possible). \
             For names, extract full names where available. \
             For identification numbers, pay attention to formats like A-Numbers \
             (e.g., A12345678) and receipt numbers.\n\n\
             Use the {} tool to return the structured data.",
            schema.name(),
            truncated,
            EXTRACTION_TOOL
        );

        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            tools: vec![tool],
            tool_choice: json!({ "type": "tool", "name": EXTRACTION_TOOL }),
        }
    }

    async fn call_messages(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        let url = format!("{}/v1/messages", self.config.endpoint);
        debug!("Calling {} with model {}", url, request.model);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(body),
                429 => LlmError::RateLimited,
                code => LlmError::Api {
                    status: code,
                    message: body,
                },
            });
        }

        resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))
    }
}

/// Pull the forced tool call out of a messages response and map it
/// onto the schema's field set.
fn parse_tool_response(
    response: &MessagesResponse,
    schema: &Schema,
) -> Result<BTreeMap<String, Option<String>>, LlmError> {
    let input = response
        .content
        .iter()
        .find(|block| block.kind == "tool_use" && block.name.as_deref() == Some(EXTRACTION_TOOL))
        .and_then(|block| block.input.as_ref())
        .ok_or_else(|| LlmError::Parse("no tool_use block in response".to_string()))?;

    let object = input
        .as_object()
        .ok_or_else(|| LlmError::Parse("tool input is not an object".to_string()))?;

    let mut fields = BTreeMap::new();
    for field in schema.fields() {
        let value = object.get(field.name).and_then(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        fields.insert(field.name.to_string(), value);
    }
    Ok(fields)
}

/// Truncate at a UTF-8 boundary at or before `max` bytes.
fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(input: Value) -> MessagesResponse {
        MessagesResponse {
            content: vec![
                ContentBlock {
                    kind: "text".to_string(),
                    name: None,
                    input: None,
                },
                ContentBlock {
                    kind: "tool_use".to_string(),
                    name: Some(EXTRACTION_TOOL.to_string()),
                    input: Some(input),
                },
            ],
        }
    }

    #[test]
    fn parses_tool_response_fields() {
        let schema = Schema::by_name("client").unwrap();
        let response = response_with(json!({
            "full_name": "Maria Lopez",
            "a_number": "A12345678",
            "dob": null,
            "unknown_extra": "dropped",
        }));

        let fields = parse_tool_response(&response, schema).unwrap();
        assert_eq!(fields["full_name"].as_deref(), Some("Maria Lopez"));
        assert_eq!(fields["a_number"].as_deref(), Some("A12345678"));
        assert_eq!(fields["dob"], None);
        // Every schema field is present, extras are dropped.
        assert_eq!(fields.len(), schema.fields().len());
        assert!(!fields.contains_key("unknown_extra"));
    }

    #[test]
    fn empty_strings_become_null() {
        let schema = Schema::by_name("client").unwrap();
        let response = response_with(json!({ "full_name": "   " }));
        let fields = parse_tool_response(&response, schema).unwrap();
        assert_eq!(fields["full_name"], None);
    }

    #[test]
    fn missing_tool_block_is_parse_error() {
        let schema = Schema::by_name("client").unwrap();
        let response = MessagesResponse { content: vec![] };
        assert!(matches!(
            parse_tool_response(&response, schema),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn transient_classification() {
        assert!(LlmError::RateLimited.is_transient());
        assert!(LlmError::Connection("timeout".to_string()).is_transient());
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::Auth("bad key".to_string()).is_transient());
        assert!(!LlmError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
    }

    #[test]
    fn utf8_truncation_respects_boundaries() {
        let text = "héllo wörld";
        let truncated = truncate_utf8(text, 2);
        assert!(truncated.len() <= 2);
        assert!(text.starts_with(truncated));
        assert_eq!(truncate_utf8("short", 100), "short");
    }

    #[test]
    fn default_config() {
        let config = LlmConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_retries, 3);
        assert!(config.endpoint.contains("anthropic"));
    }
}
