use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Minimal JSON POST request shared by every provider adapter.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Builds a POST request carrying a JSON body.
    ///
    /// The helper sets the `Content-Type` header to `application/json`; adapters that
    /// supply their own header map through [`HttpRequest::with_headers`] replace it.
    ///
    /// # Examples
    ///
    /// ```
    /// use polychat::http::HttpRequest;
    ///
    /// let request = HttpRequest::post_json("https://example.com", br"{}".to_vec());
    /// assert_eq!(request.headers.get("Content-Type"), Some(&"application/json".to_string()));
    /// assert!(request.timeout.is_none());
    /// ```
    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body,
            timeout: None,
        }
    }

    /// Replaces the request headers after construction.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the upper bound the transport should wait for a response.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Decodes the body as UTF-8, replacing invalid sequences.
    ///
    /// Error bodies are surfaced verbatim to callers, so a lossy decode is preferred over
    /// failing the diagnostic path.
    ///
    /// # Examples
    ///
    /// ```
    /// use polychat::http::HttpResponse;
    ///
    /// let response = HttpResponse { status: 500, headers: Default::default(), body: b"server error".to_vec() };
    /// assert_eq!(response.text(), "server error");
    /// ```
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failures raised below the HTTP status layer.
///
/// Transports know nothing about providers; [`crate::ChatClient`] attaches the provider
/// name when converting these into [`crate::ChatError::Api`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response arrived within the allowed time.
    #[error("no response within {}s", .after.as_secs())]
    Timeout { after: Duration },
    /// The connection could not be established or the request failed mid-flight.
    #[error("request failed: {message}")]
    Connect { message: String },
    /// The response body could not be read.
    #[error("failed to read response body: {message}")]
    Body { message: String },
    /// The request could not be encoded, for example a header value with control characters.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Transport abstraction used to decouple adapters from the concrete HTTP client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a POST request and resolves when the full response body is available.
    ///
    /// # Examples
    ///
    /// ```
    /// # use async_trait::async_trait;
    /// # use polychat::http::{HttpTransport, HttpRequest, HttpResponse, TransportError};
    /// struct MemoryTransport;
    ///
    /// #[async_trait]
    /// impl HttpTransport for MemoryTransport {
    ///     async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    ///         Ok(HttpResponse { status: 200, headers: request.headers, body: b"{}".to_vec() })
    ///     }
    /// }
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let response = MemoryTransport
    ///     .send(HttpRequest::post_json("https://example.com", br"{}".to_vec()))
    ///     .await
    ///     .unwrap();
    /// assert_eq!(response.status, 200);
    /// # });
    /// ```
    ///
    /// # Errors
    ///
    /// Implementations return [`TransportError::Timeout`] when the request's timeout
    /// elapses and the other variants for network or encoding failures. A non-success
    /// status is not an error at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Thread-safe handle to a transport implementation.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Serializes a body to JSON, attaches headers and timeout, and issues a POST request.
///
/// # Errors
///
/// Returns [`TransportError::InvalidRequest`] if serialization fails or forwards the
/// error raised by [`HttpTransport::send`].
pub async fn post_json_with_headers<T: Serialize>(
    transport: &dyn HttpTransport,
    url: impl Into<String>,
    headers: HashMap<String, String>,
    body: &T,
    timeout: Duration,
) -> Result<HttpResponse, TransportError> {
    let payload = serde_json::to_vec(body).map_err(|err| TransportError::InvalidRequest {
        message: format!("failed to serialize request: {err}"),
    })?;
    let request = HttpRequest::post_json(url, payload)
        .with_headers(headers)
        .with_timeout(timeout);
    transport.send(request).await
}

pub mod reqwest;
