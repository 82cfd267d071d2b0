//! Client error types.

use serde_json::Value;
use thiserror::Error;
use traktor_core::{CacheError, Response};

// ============================================================================
// Client Error
// ============================================================================

/// Error type for endpoint calls.
///
/// The type is `Clone` so a single call result can be handed both to the
/// caller and to every call listener.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A required path placeholder had no value.
    #[error("missing mandatory path parameter: '{0}'")]
    MissingPathParameter(String),

    /// A required query key had no value.
    #[error("missing mandatory query parameter: '{0}'")]
    MissingQueryParameter(String),

    /// A required body field had no value.
    #[error("missing mandatory body parameter: '{0}'")]
    MissingBodyParameter(String),

    /// The template could not be resolved into a request.
    #[error("invalid endpoint template: {0}")]
    InvalidTemplate(String),

    /// The template's validate hook rejected the parameters.
    #[error("parameter validation failed for {0}")]
    ValidationFailed(String),

    /// A header name or value was not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Credentials are required but absent.
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// The request was cancelled.
    #[error("request aborted")]
    Aborted,

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport refused the target domain.
    #[error("domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Non-success response, returned as-is.
    #[error("HTTP {} from {}", .0.status, .0.url)]
    Response(Box<Response>),

    /// Provider error envelope parsed from the response body.
    #[error("provider error: {0}")]
    Envelope(Value),

    /// The cache store failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(String),
}

impl ClientError {
    /// Returns true if the call was cancelled by the caller.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns true for errors raised before any network I/O because the
    /// call itself was malformed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingPathParameter(_)
                | Self::MissingQueryParameter(_)
                | Self::MissingBodyParameter(_)
                | Self::InvalidTemplate(_)
                | Self::ValidationFailed(_)
                | Self::InvalidHeader(_)
        )
    }

    /// HTTP status of a protocol error, if known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response(response) => Some(response.status),
            Self::Envelope(value) => value
                .get("status_code")
                .or_else(|| value.get("status"))
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok()),
            _ => None,
        }
    }

    /// The raw response of a protocol error.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Response(response) => Some(response),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err.to_string())
    }
}

impl From<CacheError> for ClientError {
    fn from(err: CacheError) -> Self {
        ClientError::Cache(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidTemplate(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages() {
        assert_eq!(
            ClientError::MissingPathParameter("id".into()).to_string(),
            "missing mandatory path parameter: 'id'"
        );
        assert_eq!(
            ClientError::MissingQueryParameter("q".into()).to_string(),
            "missing mandatory query parameter: 'q'"
        );
        assert_eq!(
            ClientError::MissingBodyParameter("a".into()).to_string(),
            "missing mandatory body parameter: 'a'"
        );
    }

    #[test]
    fn test_status() {
        let err = ClientError::Response(Box::new(Response::new("https://x/y", 404)));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404 from https://x/y");

        let err = ClientError::Envelope(json!({"status_code": 34, "status_message": "nope"}));
        assert_eq!(err.status(), Some(34));

        assert_eq!(ClientError::Aborted.status(), None);
    }

    #[test]
    fn test_categories() {
        assert!(ClientError::Aborted.is_abort());
        assert!(ClientError::MissingBodyParameter("a".into()).is_configuration());
        assert!(!ClientError::AuthenticationRequired("x".into()).is_configuration());
    }
}
