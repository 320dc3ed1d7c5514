use std::collections::HashMap;

use serde_json::{Value, json};

use crate::config::{ProviderConfig, ProviderKind};
use crate::types::ChatRequest;

use super::extract::{ExtractError, PathStep, text_at};
use super::{ProviderAdapter, insert_credential_header, json_headers};

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const REPLY_PATH: [PathStep; 3] = [PathStep::Key("content"), PathStep::Index(0), PathStep::Key("text")];

/// Anthropic Messages API（Claude）
pub(crate) struct AnthropicMessagesAdapter;

impl ProviderAdapter for AnthropicMessagesAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn build_headers(&self, config: &ProviderConfig) -> HashMap<String, String> {
        let mut headers = json_headers();
        insert_credential_header(&mut headers, config);
        if let Some(version) = &config.api_version {
            headers.insert("anthropic-version".to_string(), version.clone());
        }
        headers
    }

    fn build_payload(&self, request: &ChatRequest) -> Value {
        json!({
            "model": request.model_or(DEFAULT_MODEL),
            "max_tokens": request.max_tokens,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
        })
    }

    fn extract_text(&self, response: &Value) -> Result<String, ExtractError> {
        text_at(response, &REPLY_PATH)
    }
}
