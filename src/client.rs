use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, warn};

use crate::config::{ClientConfig, ProviderKind};
use crate::error::{ApiErrorKind, ChatError};
use crate::http::reqwest::default_dyn_transport;
use crate::http::{DynHttpTransport, HttpResponse, TransportError, post_json_with_headers};
use crate::provider::{ProviderAdapter, adapter};
use crate::types::ChatRequest;

/// Hard upper bound for one call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 统一调用入口 持有只读的供应商配置表
///
/// The configuration is fixed at construction; every call reads it without locking, so a
/// client can be shared (for example behind an `Arc`) and used concurrently.
pub struct ChatClient {
    config: ClientConfig,
    transport: DynHttpTransport,
    timeout: Duration,
}

impl ChatClient {
    /// Reads all provider credentials from the environment and uses the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] if any of `OPENAI_API_KEY`,
    /// `ANTHROPIC_API_KEY` or `GOOGLE_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::builder().config(ClientConfig::from_env()?).build()
    }

    /// 创建 Builder 便于注入配置与 Transport
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder {
            config: None,
            transport: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sends `request` to `provider` and returns the reply text.
    ///
    /// `provider` is one of `"openai"`, `"claude"` or `"gemini"`. A prompt can be passed
    /// directly when the defaults are fine:
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), polychat::ChatError> {
    /// use polychat::{ChatClient, ChatRequest};
    ///
    /// let client = ChatClient::from_env()?;
    /// let reply = client.chat("openai", "Explain AI security in one sentence").await?;
    /// let haiku = client
    ///     .chat("claude", ChatRequest::new("Write a haiku about cybersecurity").with_max_tokens(100))
    ///     .await?;
    /// # let _ = (reply, haiku);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`ChatError::UnknownProvider`] before any network activity.
    /// - [`ChatError::Api`] for non-200 statuses, timeouts, transport failures and
    ///   non-JSON bodies.
    /// - [`ChatError::MalformedResponse`] when the reply text is not where the provider
    ///   puts it.
    pub async fn chat(
        &self,
        provider: &str,
        request: impl Into<ChatRequest>,
    ) -> Result<String, ChatError> {
        let kind: ProviderKind = provider.parse()?;
        let request = request.into();
        self.dispatch(kind, &request)
            .instrument(info_span!("chat", provider = kind.as_str()))
            .await
    }

    /// Like [`ChatClient::chat`], but abandons the in-flight request once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Cancelled`] when the token is cancelled before a result is
    /// available, otherwise the same errors as [`ChatClient::chat`].
    pub async fn chat_with_cancel(
        &self,
        provider: &str,
        request: impl Into<ChatRequest>,
        cancel: &CancellationToken,
    ) -> Result<String, ChatError> {
        let kind: ProviderKind = provider.parse()?;
        let request = request.into();
        let call = self
            .dispatch(kind, &request)
            .instrument(info_span!("chat", provider = kind.as_str()));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(provider = kind.as_str(), "request cancelled by caller");
                Err(ChatError::Cancelled { provider: kind.as_str() })
            }
            result = call => result,
        }
    }

    /// 返回已配置的供应商
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.config.kinds()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn dispatch(&self, kind: ProviderKind, request: &ChatRequest) -> Result<String, ChatError> {
        let adapter = adapter(kind);
        let name = adapter.name();
        let config = self.config.get(kind).ok_or_else(|| ChatError::Configuration {
            provider: name,
            reason: "Missing API key".to_string(),
        })?;

        let headers = adapter.build_headers(config);
        let payload = adapter.build_payload(request);
        let url = adapter.resolve_url(config);
        debug!(
            endpoint = %config.endpoint_url,
            model = request.model_or(adapter.default_model()),
            max_tokens = request.max_tokens,
            "sending chat request"
        );

        let send = post_json_with_headers(
            self.transport.as_ref(),
            url,
            headers,
            &payload,
            self.timeout,
        );
        let response = match tokio::time::timeout(self.timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                after: self.timeout,
            }),
        }
        .map_err(|err| {
            warn!(error = %err, "transport failure");
            ChatError::from_transport(name, err)
        })?;

        let body = ensure_success(name, response)?;
        let text = adapter
            .extract_text(&body)
            .map_err(|err| {
                warn!(error = %err, "unexpected response shape");
                ChatError::malformed(name, err.to_string())
            })?;
        debug!(chars = text.chars().count(), "received reply");
        Ok(text)
    }
}

/// Checks for HTTP 200 and decodes the body as JSON.
fn ensure_success(provider: &'static str, response: HttpResponse) -> Result<Value, ChatError> {
    debug!(status = response.status, "received response");
    if response.status != 200 {
        let body = response.text();
        warn!(status = response.status, "provider returned error status");
        return Err(ChatError::status(provider, response.status, body));
    }
    serde_json::from_slice(&response.body).map_err(|err| ChatError::Api {
        provider,
        kind: ApiErrorKind::Decode,
        status: None,
        message: err.to_string(),
    })
}

/// 负责组装 ChatClient 的 Builder
pub struct ChatClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<DynHttpTransport>,
    timeout: Duration,
}

impl ChatClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default reqwest transport.
    pub fn transport(mut self, transport: DynHttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Overrides the per-call timeout (30 seconds by default).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when no configuration was supplied or a
    /// provider lacks its credential.
    pub fn build(self) -> Result<ChatClient, ChatError> {
        let config = match self.config {
            Some(config) => config,
            None => ClientConfig::from_env()?,
        };
        config.validate()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_dyn_transport().map_err(|err| ChatError::Configuration {
                provider: "http",
                reason: err.to_string(),
            })?,
        };
        Ok(ChatClient {
            config,
            transport,
            timeout: self.timeout,
        })
    }
}
