use thiserror::Error;

use crate::http::TransportError;

/// Aggregates every failure mode exposed by [`crate::ChatClient`].
///
/// Each variant is a distinct kind so callers can tell configuration mistakes, caller
/// misuse, HTTP-level failures and unexpected response shapes apart without parsing
/// messages.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Raised while constructing the client when a provider cannot be configured.
    #[error("{reason} for {provider}")]
    Configuration {
        /// Provider identifier such as `openai`.
        provider: &'static str,
        /// Why the entry was rejected.
        reason: String,
    },
    /// The requested provider identifier is not part of the supported set.
    #[error("Unknown provider: {name}")]
    UnknownProvider { name: String },
    /// The request reached the transport but did not produce a usable response body.
    #[error("{provider} API error: {}", describe_api(.kind, .status, .message))]
    Api {
        /// Provider identifier such as `claude`.
        provider: &'static str,
        /// Which stage of the exchange failed.
        kind: ApiErrorKind,
        /// HTTP status code, present only for [`ApiErrorKind::Status`].
        status: Option<u16>,
        /// Raw diagnostic text; the full response body for status failures.
        message: String,
    },
    /// The response decoded as JSON but the reply text was not where the provider puts it.
    #[error("Invalid {provider} response format: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },
    /// The caller cancelled the call while the request was in flight.
    #[error("{provider} request cancelled by caller")]
    Cancelled { provider: &'static str },
}

/// Stage of an HTTP exchange that produced a [`ChatError::Api`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The remote answered with a status other than 200.
    Status,
    /// No response arrived before the call timeout elapsed.
    Timeout,
    /// Connection, request serialization or body read failure.
    Transport,
    /// The body could not be decoded as JSON.
    Decode,
}

fn describe_api(kind: &ApiErrorKind, status: &Option<u16>, message: &str) -> String {
    match (kind, *status) {
        (ApiErrorKind::Status, Some(status)) => format!("HTTP {status} - {message}"),
        (ApiErrorKind::Timeout, _) => format!("timed out - {message}"),
        (ApiErrorKind::Decode, _) => format!("invalid JSON body - {message}"),
        _ => message.to_string(),
    }
}

impl ChatError {
    /// Builds a [`ChatError::Api`] for a non-200 response.
    ///
    /// # Examples
    ///
    /// ```
    /// use polychat::error::ChatError;
    ///
    /// let err = ChatError::status("openai", 500, "server error");
    /// assert_eq!(err.to_string(), "openai API error: HTTP 500 - server error");
    /// ```
    pub fn status<T: Into<String>>(provider: &'static str, status: u16, body: T) -> Self {
        Self::Api {
            provider,
            kind: ApiErrorKind::Status,
            status: Some(status),
            message: body.into(),
        }
    }

    /// Attaches the provider name to a transport failure.
    pub fn from_transport(provider: &'static str, err: TransportError) -> Self {
        let kind = match err {
            TransportError::Timeout { .. } => ApiErrorKind::Timeout,
            _ => ApiErrorKind::Transport,
        };
        Self::Api {
            provider,
            kind,
            status: None,
            message: err.to_string(),
        }
    }

    /// Creates a [`ChatError::MalformedResponse`].
    pub fn malformed<T: Into<String>>(provider: &'static str, reason: T) -> Self {
        Self::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Returns `true` when the call failed because the timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Api {
                kind: ApiErrorKind::Timeout,
                ..
            }
        )
    }

    /// Provider identifier the failure relates to, when there is one.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            Self::Configuration { provider, .. }
            | Self::Api { provider, .. }
            | Self::MalformedResponse { provider, .. }
            | Self::Cancelled { provider } => Some(*provider),
            Self::UnknownProvider { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn status_error_display_carries_provider_status_and_body() {
        let err = ChatError::status("gemini", 503, "overloaded");
        let text = err.to_string();
        assert!(text.contains("gemini"));
        assert!(text.contains("503"));
        assert!(text.contains("overloaded"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn transport_timeout_maps_to_timeout_kind() {
        let err = ChatError::from_transport(
            "claude",
            TransportError::Timeout {
                after: Duration::from_secs(30),
            },
        );
        assert!(err.is_timeout());
        match err {
            ChatError::Api { kind, status, .. } => {
                assert_eq!(kind, ApiErrorKind::Timeout);
                assert_eq!(status, None);
            }
            other => panic!("unexpected error type: {other:?}"),
        }
    }

    #[test]
    fn connect_failure_maps_to_transport_kind() {
        let err = ChatError::from_transport(
            "openai",
            TransportError::Connect {
                message: "connection refused".to_string(),
            },
        );
        assert!(!err.is_timeout());
        assert!(matches!(
            err,
            ChatError::Api {
                kind: ApiErrorKind::Transport,
                ..
            }
        ));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn configuration_error_names_provider() {
        let err = ChatError::Configuration {
            provider: "claude",
            reason: "Missing API key".to_string(),
        };
        assert_eq!(err.to_string(), "Missing API key for claude");
        assert_eq!(err.provider(), Some("claude"));
    }
}
