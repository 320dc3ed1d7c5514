use std::collections::HashMap;

use serde_json::{Value, json};

use crate::config::{ProviderConfig, ProviderKind};
use crate::types::ChatRequest;

use super::extract::{ExtractError, PathStep, text_at};
use super::{ProviderAdapter, insert_credential_header, json_headers};

const DEFAULT_MODEL: &str = "gpt-4o";
const REPLY_PATH: [PathStep; 4] = [
    PathStep::Key("choices"),
    PathStep::Index(0),
    PathStep::Key("message"),
    PathStep::Key("content"),
];

/// OpenAI Chat Completions
pub(crate) struct OpenAiChatAdapter;

impl ProviderAdapter for OpenAiChatAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn build_headers(&self, config: &ProviderConfig) -> HashMap<String, String> {
        let mut headers = json_headers();
        insert_credential_header(&mut headers, config);
        headers
    }

    fn build_payload(&self, request: &ChatRequest) -> Value {
        json!({
            "model": request.model_or(DEFAULT_MODEL),
            "messages": [{"role": "user", "content": request.prompt}],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        })
    }

    fn extract_text(&self, response: &Value) -> Result<String, ExtractError> {
        text_at(response, &REPLY_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_bearer_credential() {
        let config = ProviderConfig::default_for(ProviderKind::OpenAi, "sk-test");
        let headers = OpenAiChatAdapter.build_headers(&config);
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer sk-test")
        );
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn url_is_endpoint_unchanged() {
        let config = ProviderConfig::default_for(ProviderKind::OpenAi, "sk-test");
        assert_eq!(
            OpenAiChatAdapter.resolve_url(&config),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn payload_uses_default_model_and_passes_options_through() {
        let payload = OpenAiChatAdapter.build_payload(&ChatRequest::new("hi"));
        assert_eq!(
            payload,
            json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 1000,
                "temperature": 0.7,
            })
        );
    }

    #[test]
    fn payload_honours_model_override() {
        let request = ChatRequest::new("hi")
            .with_model("gpt-4o-mini")
            .with_max_tokens(5000)
            .with_temperature(1.5);
        let payload = OpenAiChatAdapter.build_payload(&request);
        assert_eq!(payload["model"], json!("gpt-4o-mini"));
        // no local clamping
        assert_eq!(payload["max_tokens"], json!(5000));
        assert_eq!(payload["temperature"], json!(1.5));
    }

    #[test]
    fn extract_reads_first_choice() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hello"}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(OpenAiChatAdapter.extract_text(&body).unwrap(), "hello");
    }

    #[test]
    fn extract_rejects_empty_object() {
        let err = OpenAiChatAdapter.extract_text(&json!({})).unwrap_err();
        assert_eq!(err.detail, "missing key 'choices'");
    }
}
