use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{DynHttpTransport, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// 基于 reqwest 的默认 HttpTransport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 使用自定义 reqwest::Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 创建默认配置
    pub fn default_client() -> Result<Self, TransportError> {
        Client::builder()
            .build()
            .map(Self::new)
            .map_err(|err| TransportError::InvalidRequest {
                message: format!("failed to create reqwest client: {err}"),
            })
    }

    fn build_request(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let mut builder = self.client.post(&request.url);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        for (name, value) in request.headers {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::InvalidRequest {
                    message: format!("invalid header name: {err}"),
                })?;
            let header_value = reqwest::header::HeaderValue::from_str(&value).map_err(|err| {
                TransportError::InvalidRequest {
                    message: format!("invalid header value for {header_name}: {err}"),
                }
            })?;
            builder = builder.header(header_name, header_value);
        }

        Ok(builder.body(request.body))
    }

    fn headers_to_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn map_error(err: reqwest::Error, timeout: Option<Duration>) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                after: timeout.unwrap_or_default(),
            }
        } else {
            // reqwest embeds the full URL in its messages; gemini carries its key there.
            TransportError::Connect {
                message: err.without_url().to_string(),
            }
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(|err| Self::map_error(err, timeout))?;

        let status = response.status().as_u16();
        let headers = Self::headers_to_map(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| match Self::map_error(err, timeout) {
                TransportError::Connect { message } => TransportError::Body { message },
                other => other,
            })?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// 便捷构造线程安全 Transport
pub fn default_dyn_transport() -> Result<DynHttpTransport, TransportError> {
    Ok(Arc::new(ReqwestTransport::default_client()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_rejects_invalid_header_value() {
        let transport = ReqwestTransport::default_client().expect("client");
        let request = HttpRequest::post_json("https://example.com", b"{}".to_vec())
            .with_headers(HashMap::from([("x-api-key".to_string(), "bad\nkey".to_string())]));

        match transport.build_request(request) {
            Err(TransportError::InvalidRequest { message }) => {
                assert!(message.contains("x-api-key"), "unexpected message: {message}");
            }
            Err(other) => panic!("unexpected error type: {other:?}"),
            Ok(_) => panic!("expected invalid header error"),
        }
    }

    #[test]
    fn build_request_applies_headers_and_timeout() {
        let transport = ReqwestTransport::default_client().expect("client");
        let request = HttpRequest::post_json("https://example.com/v1/messages", b"{}".to_vec())
            .with_timeout(Duration::from_secs(30));

        let built = transport
            .build_request(request)
            .expect("builder")
            .build()
            .expect("request");
        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().as_str(), "https://example.com/v1/messages");
        assert_eq!(built.timeout(), Some(&Duration::from_secs(30)));
        assert_eq!(
            built.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }
}
