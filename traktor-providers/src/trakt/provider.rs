//! Trakt request and response hooks.

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use traktor_core::{AuthRequirement, Endpoint, Pagination, ProviderKind, Response};
use traktor_fetch::ClientError;
use traktor_fetch::Provider;
use traktor_fetch::client::header_value;
use url::Url;

use crate::api_client::KnownProvider;
use crate::error::{ProviderError, parse_endpoint};

// ============================================================================
// Constants
// ============================================================================

/// Production API base URL.
pub const TRAKT_API_URL: &str = "https://api.trakt.tv";

/// API version sent with every request.
pub const TRAKT_API_VERSION: &str = "2";

/// Condition active for VIP accounts.
pub const VIP_CONDITION: &str = "vip";

/// Extension key for the sort headers.
pub const SORT_EXTENSION: &str = "sort";

const API_KEY_HEADER: &str = "trakt-api-key";
const API_VERSION_HEADER: &str = "trakt-api-version";

// ============================================================================
// Configuration & Auth
// ============================================================================

/// Application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraktConfig {
    /// OAuth client id, sent as `trakt-api-key`.
    pub client_id: String,
    /// API base URL.
    pub endpoint: String,
}

impl TraktConfig {
    /// Creates a configuration against the production API.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            endpoint: TRAKT_API_URL.to_string(),
        }
    }

    /// Overrides the API base URL (e.g. the staging API).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// User authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraktAuth {
    /// OAuth access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// OAuth refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the account has VIP.
    #[serde(default)]
    pub vip: bool,
}

impl TraktAuth {
    /// Auth holding only an access token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Returns true if the access token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// The access token if present and not expired.
    pub fn usable_token(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.is_expired(now) {
            return None;
        }
        self.access_token.as_deref()
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Trakt provider hooks.
#[derive(Debug)]
pub struct TraktProvider {
    client_id: String,
    endpoint: Url,
}

impl TraktProvider {
    /// Creates the provider.
    ///
    /// # Errors
    ///
    /// Fails on an empty client id or an unparsable endpoint.
    pub fn new(config: &TraktConfig) -> Result<Self, ProviderError> {
        if config.client_id.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: ProviderKind::Trakt,
                field: "client_id",
            });
        }
        Ok(Self {
            client_id: config.client_id.clone(),
            endpoint: parse_endpoint(&config.endpoint)?,
        })
    }
}

impl KnownProvider for TraktProvider {
    const KIND: ProviderKind = ProviderKind::Trakt;
}

impl Provider for TraktProvider {
    type Auth = TraktAuth;

    fn name(&self) -> &str {
        "trakt"
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn conditions(&self, auth: &TraktAuth) -> Vec<String> {
        if auth.vip {
            vec![VIP_CONDITION.to_string()]
        } else {
            Vec::new()
        }
    }

    fn parse_headers(
        &self,
        template: &Endpoint,
        auth: &TraktAuth,
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(TRAKT_API_VERSION),
        );
        headers.insert(HeaderName::from_static(API_KEY_HEADER), header_value(&self.client_id)?);

        let token = auth.usable_token(Utc::now());
        match (template.opts().auth, token) {
            (AuthRequirement::Required, None) => {
                return Err(ClientError::AuthenticationRequired(template.signature()));
            }
            (AuthRequirement::Required | AuthRequirement::Optional, Some(token)) => {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }
            _ => {}
        }

        Ok(headers)
    }

    fn parse_response(
        &self,
        _template: &Endpoint,
        mut response: Response,
    ) -> Result<Response, ClientError> {
        if !response.ok() {
            return Err(ClientError::Response(Box::new(response)));
        }

        let pagination = pagination_from_headers(&response);
        response.set_pagination(&pagination);

        let by = response.header("x-sort-by").map(str::to_string);
        let how = response.header("x-sort-how").map(str::to_string);
        if by.is_some() || how.is_some() {
            response.set_extension(SORT_EXTENSION, json!({ "by": by, "how": how }));
        }

        Ok(response)
    }
}

/// Reads the `x-pagination-*` headers.
pub fn pagination_from_headers(response: &Response) -> Pagination {
    let number = |name: &str| response.header(name).and_then(|v| v.trim().parse::<u64>().ok());
    let small = |name: &str| number(name).and_then(|v| u32::try_from(v).ok());

    Pagination {
        page: small("x-pagination-page"),
        limit: small("x-pagination-limit"),
        page_count: small("x-pagination-page-count"),
        item_count: number("x-pagination-item-count"),
        next: None,
        prev: None,
    }
}

// ============================================================================
// Tests
// ============================================================================
