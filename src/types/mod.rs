//! Call-scoped request data.
//!
//! A [`ChatRequest`] is created for a single call and discarded afterwards; nothing here
//! is cached between calls.

use serde::{Deserialize, Serialize};

/// Default completion budget when the caller does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Default sampling temperature when the caller does not set one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Single-turn chat request shared across providers.
///
/// `max_tokens` and `temperature` are forwarded unchanged; the remote API enforces its
/// own limits.
///
/// # Examples
///
/// ```
/// use polychat::ChatRequest;
///
/// let request = ChatRequest::new("Write a haiku about cybersecurity").with_max_tokens(100);
/// assert_eq!(request.max_tokens, 100);
/// assert_eq!(request.temperature, 0.7);
/// assert!(request.model.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    /// Overrides the provider's default model when set.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the override model or `default`.
    pub(crate) fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }
}

impl From<&str> for ChatRequest {
    fn from(prompt: &str) -> Self {
        Self::new(prompt)
    }
}

impl From<String> for ChatRequest {
    fn from(prompt: String) -> Self {
        Self::new(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_fills_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert_eq!(request, ChatRequest::new("hi"));
    }

    #[test]
    fn model_or_prefers_override() {
        let request = ChatRequest::from("hi");
        assert_eq!(request.model_or("gpt-4o"), "gpt-4o");
        let request = request.with_model("gpt-4o-mini");
        assert_eq!(request.model_or("gpt-4o"), "gpt-4o-mini");
    }
}
