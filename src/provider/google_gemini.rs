use std::collections::HashMap;

use secrecy::ExposeSecret;
use serde_json::{Value, json};

use crate::config::{ProviderConfig, ProviderKind};
use crate::types::ChatRequest;

use super::extract::{ExtractError, PathStep, text_at};
use super::{ProviderAdapter, json_headers};

/// The endpoint URL pins the model; request overrides are not sent.
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const REPLY_PATH: [PathStep; 6] = [
    PathStep::Key("candidates"),
    PathStep::Index(0),
    PathStep::Key("content"),
    PathStep::Key("parts"),
    PathStep::Index(0),
    PathStep::Key("text"),
];

/// Google Gemini GenerateContent.
///
/// The credential travels as the `key` query parameter, never as a header.
pub(crate) struct GoogleGeminiAdapter;

impl ProviderAdapter for GoogleGeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn build_headers(&self, _config: &ProviderConfig) -> HashMap<String, String> {
        json_headers()
    }

    fn resolve_url(&self, config: &ProviderConfig) -> String {
        let separator = if config.endpoint_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}key={}",
            config.endpoint_url,
            config.credential.expose_secret()
        )
    }

    fn build_payload(&self, request: &ChatRequest) -> Value {
        json!({
            "contents": [{"parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        })
    }

    fn extract_text(&self, response: &Value) -> Result<String, ExtractError> {
        text_at(response, &REPLY_PATH)
    }
}
