//! OpenAI-compatible extraction backend.
//!
//! Sends the user's utterance plus field context to a chat-completions
//! endpoint and parses the model's reply as the structured intent contract:
//! `{intent, extracted_value, confidence, reasoning}`. Anything the endpoint
//! returns that does not fit the contract is reported as a malformed
//! response; the application layer degrades it to a fallback intent.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::dialogue::{ExtractedIntent, IntentKind, Speaker};
use crate::domain::schema::{FieldKind, FormFieldSpec};
use crate::ports::{ExtractionError, ExtractionRequest, IntentExtractor};

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are a data extraction specialist. Extract structured information from \
user input for a specific form field.\n\
\n\
Current field: {field_name}\n\
Field description: {field_description}\n\
Validation rules: {validation_rules}\n\
\n\
Respond with a single JSON object:\n\
{\"intent\": \"provide_value\" | \"confirm\" | \"deny\" | \"request_help\" | \
\"request_skip\" | \"other\", \"extracted_value\": <value or null>, \
\"confidence\": <0..1>, \"reasoning\": \"<brief explanation>\"}\n\
\n\
Only extract values that directly relate to the current field.";

/// Configuration for the OpenAI-compatible extractor.
#[derive(Debug, Clone)]
pub struct OpenAiExtractorConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiExtractorConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Extractor backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiExtractor {
    config: OpenAiExtractorConfig,
    client: Client,
}

impl OpenAiExtractor {
    /// Creates a new extractor with the given configuration.
    pub fn new(config: OpenAiExtractorConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn system_prompt(field: &FormFieldSpec) -> String {
        EXTRACTION_SYSTEM_PROMPT
            .replace("{field_name}", field.name.as_str())
            .replace("{field_description}", field.description)
            .replace("{validation_rules}", &rules_summary(field))
    }

    fn to_chat_request(&self, request: &ExtractionRequest<'_>) -> ChatRequest {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: Self::system_prompt(request.field),
        }];
        for message in request.history {
            messages.push(ChatMessage {
                role: match message.speaker {
                    Speaker::User => "user",
                    Speaker::Assistant => "assistant",
                }
                .to_string(),
                content: message.text.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.user_text.to_string(),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.0,
        }
    }
}

/// Human-readable constraint summary embedded in the extraction prompt.
fn rules_summary(field: &FormFieldSpec) -> String {
    match field.kind {
        FieldKind::Text { min_len, max_len } => {
            format!("text between {} and {} characters", min_len, max_len)
        }
        FieldKind::EmailAddress => "a valid email address".to_string(),
        FieldKind::Integer { min, max } => format!("an integer between {} and {}", min, max),
        FieldKind::Choice { options } => format!("one of: {}", options.join(", ")),
        FieldKind::TextList {
            min_items,
            max_items,
            item_min_len,
            item_max_len,
        } => format!(
            "a list of {}-{} items, each {}-{} characters",
            min_items, max_items, item_min_len, item_max_len
        ),
        FieldKind::IsoDate => "a date in YYYY-MM-DD format".to_string(),
    }
}

/// Parses the model's reply into the intent contract.
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence.
fn parse_intent_payload(content: &str) -> Result<ExtractedIntent, ExtractionError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let payload: IntentPayload = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

    let intent: IntentKind = serde_json::from_value(serde_json::Value::String(payload.intent.clone()))
        .map_err(|_| {
            ExtractionError::MalformedResponse(format!("unknown intent '{}'", payload.intent))
        })?;

    let value = match payload.extracted_value {
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other),
    };

    Ok(ExtractedIntent {
        intent,
        value,
        confidence: payload.confidence.clamp(0.0, 1.0),
        reasoning: payload.reasoning.unwrap_or_default(),
    })
}

#[async_trait]
impl IntentExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractedIntent, ExtractionError> {
        let chat_request = self.to_chat_request(&request);
        debug!(field = %request.field.name, model = %self.config.model, "extraction request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    ExtractionError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Request(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ExtractionError::MalformedResponse("no choices in response".into()))?;

        parse_intent_payload(content)
    }
}

// Wire types for the chat-completions API.

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// The intent contract the backend must produce.
#[derive(Debug, Deserialize)]
struct IntentPayload {
    intent: String,
    #[serde(default)]
    extracted_value: Option<serde_json::Value>,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    reasoning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldName, FORM_SCHEMA};
    use serde_json::json;

    #[test]
    fn parses_plain_json_payload() {
        let content = r#"{"intent": "provide_value", "extracted_value": "John Smith",
                          "confidence": 0.95, "reasoning": "name given directly"}"#;
        let intent = parse_intent_payload(content).unwrap();
        assert_eq!(intent.intent, IntentKind::ProvideValue);
        assert_eq!(intent.value, Some(json!("John Smith")));
        assert_eq!(intent.confidence, 0.95);
    }

    #[test]
    fn parses_fenced_json_payload() {
        let content = "```json\n{\"intent\": \"request_skip\", \"extracted_value\": null, \
                       \"confidence\": 0.9, \"reasoning\": \"user asked to skip\"}\n```";
        let intent = parse_intent_payload(content).unwrap();
        assert_eq!(intent.intent, IntentKind::RequestSkip);
        assert!(intent.value.is_none());
    }

    #[test]
    fn json_null_value_becomes_none() {
        let content = r#"{"intent": "other", "extracted_value": null, "confidence": 0.2}"#;
        let intent = parse_intent_payload(content).unwrap();
        assert!(intent.value.is_none());
        assert_eq!(intent.reasoning, "");
    }

    #[test]
    fn non_json_content_is_malformed() {
        let result = parse_intent_payload("Sure! The user's name is John Smith.");
        assert!(matches!(result, Err(ExtractionError::MalformedResponse(_))));
    }

    #[test]
    fn unknown_intent_is_malformed() {
        let content = r#"{"intent": "greet", "extracted_value": null, "confidence": 1.0}"#;
        let result = parse_intent_payload(content);
        assert!(matches!(result, Err(ExtractionError::MalformedResponse(_))));
    }

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        let content = r#"{"intent": "provide_value", "extracted_value": 30, "confidence": 1.7}"#;
        let intent = parse_intent_payload(content).unwrap();
        assert_eq!(intent.confidence, 1.0);
    }

    #[test]
    fn system_prompt_embeds_field_context() {
        let spec = FORM_SCHEMA.field(FieldName::Age).unwrap();
        let prompt = OpenAiExtractor::system_prompt(spec);
        assert!(prompt.contains("Current field: age"));
        assert!(prompt.contains("an integer between 18 and 120"));
    }

    #[test]
    fn rules_summary_covers_choice_fields() {
        let spec = FORM_SCHEMA.field(FieldName::PreferredLanguage).unwrap();
        let summary = rules_summary(spec);
        assert!(summary.contains("Python"));
        assert!(summary.contains("Other"));
    }
}
