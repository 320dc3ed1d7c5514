use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;

/// 支持的供应商 封闭集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
    Gemini,
}

impl ProviderKind {
    /// Every supported provider, in validation order.
    pub const ALL: [ProviderKind; 3] = [Self::OpenAi, Self::Claude, Self::Gemini];

    /// Identifier accepted by [`crate::ChatClient::chat`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        }
    }

    /// Environment variable the credential is read from.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ChatError::UnknownProvider {
                name: s.to_string(),
            })
    }
}

/// Static connection settings for one provider.
///
/// The credential is held as a [`SecretString`], so `Debug` output never reveals it.
#[derive(Debug)]
pub struct ProviderConfig {
    /// Fixed endpoint the request is POSTed to.
    pub endpoint_url: String,
    pub credential: SecretString,
    /// Header carrying the credential; `None` when it travels in the URL query instead.
    pub credential_header: Option<String>,
    /// Prepended to the credential in the header value, e.g. `"Bearer "`.
    pub credential_prefix: String,
    /// Value of the `anthropic-version` header, for providers that need one.
    pub api_version: Option<String>,
}

impl ProviderConfig {
    /// Builds the fixed endpoint and credential layout for `kind`.
    pub fn default_for(kind: ProviderKind, credential: impl Into<String>) -> Self {
        let credential = SecretString::from(credential.into());
        match kind {
            ProviderKind::OpenAi => Self {
                endpoint_url: "https://api.openai.com/v1/chat/completions".to_string(),
                credential,
                credential_header: Some("Authorization".to_string()),
                credential_prefix: "Bearer ".to_string(),
                api_version: None,
            },
            ProviderKind::Claude => Self {
                endpoint_url: "https://api.anthropic.com/v1/messages".to_string(),
                credential,
                credential_header: Some("x-api-key".to_string()),
                credential_prefix: String::new(),
                api_version: Some("2023-06-01".to_string()),
            },
            ProviderKind::Gemini => Self {
                endpoint_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent".to_string(),
                credential,
                credential_header: None,
                credential_prefix: String::new(),
                api_version: None,
            },
        }
    }

    /// 自定义 endpoint 便于接入代理或测试服务器
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub(crate) fn has_credential(&self) -> bool {
        !self.credential.expose_secret().trim().is_empty()
    }
}

/// Immutable provider table owned by [`crate::ChatClient`].
#[derive(Debug, Default)]
pub struct ClientConfig {
    providers: BTreeMap<ProviderKind, ProviderConfig>,
}

impl ClientConfig {
    /// Reads every provider's credential from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] naming the first provider whose variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the table using `lookup` to resolve environment variable names.
    ///
    /// # Examples
    ///
    /// ```
    /// use polychat::config::{ClientConfig, ProviderKind};
    ///
    /// let config = ClientConfig::from_lookup(|name| Some(format!("key-for-{name}"))).unwrap();
    /// assert!(config.get(ProviderKind::Gemini).is_some());
    ///
    /// let err = ClientConfig::from_lookup(|name| {
    ///     (name != "ANTHROPIC_API_KEY").then(|| "key".to_string())
    /// })
    /// .unwrap_err();
    /// assert_eq!(err.to_string(), "Missing API key for claude");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for kind in ProviderKind::ALL {
            let credential = lookup(kind.env_var()).unwrap_or_default();
            debug!(
                provider = kind.as_str(),
                present = !credential.is_empty(),
                "loaded credential"
            );
            config = config.with_provider(kind, ProviderConfig::default_for(kind, credential));
        }
        config.validate()?;
        Ok(config)
    }

    /// Inserts or replaces the entry for `kind`.
    pub fn with_provider(mut self, kind: ProviderKind, provider: ProviderConfig) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Overrides the endpoint of an already configured provider.
    pub fn with_endpoint_url(mut self, kind: ProviderKind, endpoint_url: impl Into<String>) -> Self {
        if let Some(provider) = self.providers.remove(&kind) {
            self.providers
                .insert(kind, provider.with_endpoint_url(endpoint_url));
        }
        self
    }

    /// Checks that every supported provider is present with a non-empty credential.
    pub fn validate(&self) -> Result<(), ChatError> {
        for kind in ProviderKind::ALL {
            match self.providers.get(&kind) {
                Some(provider) if provider.has_credential() => {}
                _ => {
                    return Err(ChatError::Configuration {
                        provider: kind.as_str(),
                        reason: "Missing API key".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.get(&kind)
    }

    /// Configured providers in stable order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }
}
