//! Provider-layer errors.

use thiserror::Error;
use traktor_core::ProviderKind;
use traktor_fetch::ClientError;

/// Errors raised while building or using a provider client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No endpoint at the given dotted path.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The endpoint has no cached variant.
    #[error("endpoint is not cacheable: {0}")]
    NotCacheable(String),

    /// A credential needed to build the client is missing.
    #[error("{provider} credential missing: {field}")]
    MissingCredential {
        /// Provider the credential belongs to.
        provider: ProviderKind,
        /// Settings field that was empty.
        field: &'static str,
    },

    /// The configured API base URL does not parse.
    #[error("invalid API endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A login response did not carry a token.
    #[error("login response had no token")]
    NoToken,

    /// The underlying client failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ProviderError {
    /// HTTP status of a failed call, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status(),
            _ => None,
        }
    }
}

/// Parses an API base URL.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidEndpoint`] when `url` is not absolute.
pub fn parse_endpoint(url: &str) -> Result<url::Url, ProviderError> {
    url::Url::parse(url).map_err(|e| ProviderError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
