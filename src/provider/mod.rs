//! Per-provider request and response strategies.
//!
//! Every provider is a stateless [`ProviderAdapter`]; [`adapter`] is the only place that
//! maps a [`ProviderKind`] to its strategy, so supporting another provider means one new
//! module and one new match arm.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use serde_json::Value;

use crate::config::{ProviderConfig, ProviderKind};
use crate::types::ChatRequest;

pub(crate) mod anthropic_messages;
pub(crate) mod extract;
pub(crate) mod google_gemini;
pub(crate) mod openai_chat;

use extract::ExtractError;

/// Builds the wire request for one provider and reads its reply.
pub(crate) trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Model used when the request does not override it.
    fn default_model(&self) -> &'static str;

    /// Headers sent with every request, including the credential where it travels there.
    fn build_headers(&self, config: &ProviderConfig) -> HashMap<String, String>;

    /// URL the request is POSTed to.
    fn resolve_url(&self, config: &ProviderConfig) -> String {
        config.endpoint_url.clone()
    }

    fn build_payload(&self, request: &ChatRequest) -> Value;

    /// Pulls the reply text out of a decoded success body.
    fn extract_text(&self, response: &Value) -> Result<String, ExtractError>;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// 供应商到策略的分派表
pub(crate) fn adapter(kind: ProviderKind) -> &'static dyn ProviderAdapter {
    match kind {
        ProviderKind::OpenAi => &openai_chat::OpenAiChatAdapter,
        ProviderKind::Claude => &anthropic_messages::AnthropicMessagesAdapter,
        ProviderKind::Gemini => &google_gemini::GoogleGeminiAdapter,
    }
}

/// Content-type header shared by all providers.
pub(crate) fn json_headers() -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

/// Inserts `prefix + credential` under the configured credential header, if any.
pub(crate) fn insert_credential_header(
    headers: &mut HashMap<String, String>,
    config: &ProviderConfig,
) {
    if let Some(name) = &config.credential_header {
        headers.insert(
            name.clone(),
            format!(
                "{}{}",
                config.credential_prefix,
                config.credential.expose_secret()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_table_covers_every_kind() {
        for kind in ProviderKind::ALL {
            let adapter = adapter(kind);
            assert_eq!(adapter.kind(), kind);
            assert_eq!(adapter.name(), kind.as_str());
        }
    }

    #[test]
    fn credential_header_is_skipped_without_header_name() {
        let mut headers = json_headers();
        insert_credential_header(
            &mut headers,
            &ProviderConfig::default_for(ProviderKind::Gemini, "secret"),
        );
        assert_eq!(headers.len(), 1);
        assert!(headers.values().all(|value| !value.contains("secret")));
    }
}
