//! TVDB request and response hooks.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use traktor_core::{AuthRequirement, Endpoint, Pagination, ProviderKind, Response};
use traktor_fetch::client::header_value;
use traktor_fetch::{ClientError, Provider};
use url::Url;

use crate::api_client::KnownProvider;
use crate::error::{ProviderError, parse_endpoint};

/// Production API base URL.
pub const TVDB_API_URL: &str = "https://api4.thetvdb.com/v4";

const SUCCESS: &str = "success";

/// Application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvdbConfig {
    /// Project API key.
    pub api_key: String,
    /// Subscriber PIN, for user-supported keys.
    pub pin: Option<String>,
    /// API base URL.
    pub endpoint: String,
}

impl TvdbConfig {
    /// Creates a configuration against the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            pin: None,
            endpoint: TVDB_API_URL.to_string(),
        }
    }

    /// Sets the subscriber PIN.
    #[must_use]
    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Bearer token from `/login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvdbAuth {
    /// Bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Paging links of a TVDB list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TvdbLinks {
    /// Previous page URL.
    #[serde(default)]
    pub prev: Option<String>,
    /// Next page URL.
    #[serde(default)]
    pub next: Option<String>,
    /// Total items across pages.
    #[serde(default)]
    pub total_items: Option<u64>,
    /// Items per page.
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl From<TvdbLinks> for Pagination {
    fn from(links: TvdbLinks) -> Self {
        Pagination {
            limit: links.page_size,
            item_count: links.total_items,
            next: links.next,
            prev: links.prev,
            ..Pagination::default()
        }
    }
}

/// TVDB provider hooks.
#[derive(Debug)]
pub struct TvdbProvider {
    endpoint: Url,
}

impl TvdbProvider {
    /// Creates the provider.
    ///
    /// # Errors
    ///
    /// Fails on an empty API key or an unparsable endpoint.
    pub fn new(config: &TvdbConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: ProviderKind::Tvdb,
                field: "api_key",
            });
        }
        Ok(Self {
            endpoint: parse_endpoint(&config.endpoint)?,
        })
    }
}

impl KnownProvider for TvdbProvider {
    const KIND: ProviderKind = ProviderKind::Tvdb;
}

impl Provider for TvdbProvider {
    type Auth = TvdbAuth;

    fn name(&self) -> &str {
        "tvdb"
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn parse_headers(
        &self,
        template: &Endpoint,
        auth: &TvdbAuth,
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match (template.opts().auth, auth.token.as_deref()) {
            (AuthRequirement::None, _) => {}
            (AuthRequirement::Required, None) => {
                return Err(ClientError::AuthenticationRequired(template.signature()));
            }
            (_, Some(token)) => {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }
            (AuthRequirement::Optional, None) => {}
        }

        Ok(headers)
    }

    fn parse_response(
        &self,
        _template: &Endpoint,
        mut response: Response,
    ) -> Result<Response, ClientError> {
        let Some(Value::Object(mut envelope)) = response.json_value().ok() else {
            return if response.ok() {
                Ok(response)
            } else {
                Err(ClientError::Response(Box::new(response)))
            };
        };

        let status = envelope.get("status").and_then(Value::as_str).map(str::to_string);
        match status.as_deref() {
            Some(SUCCESS) if response.ok() => {}
            Some(_) => return Err(ClientError::Envelope(Value::Object(envelope))),
            None if response.ok() => return Ok(response),
            None => return Err(ClientError::Response(Box::new(response))),
        }

        let data = envelope.remove("data").unwrap_or(Value::Null);
        let links = envelope
            .remove("links")
            .and_then(|links| serde_json::from_value::<TvdbLinks>(links).ok())
            .unwrap_or_default();

        response.body = serde_json::to_string(&data)?;
        response.set_pagination(&Pagination::from(links));
        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> TvdbProvider {
        TvdbProvider::new(&TvdbConfig::new("key")).unwrap()
    }

    #[test]
    fn test_login_needs_no_token() {
        let login = Endpoint::post("/login").body_field("apikey", true).build();
        let headers = provider().parse_headers(&login, &TvdbAuth::default()).unwrap();
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_token_required_elsewhere() {
        let series = Endpoint::get("/series/:id").auth(AuthRequirement::Required).build();
        assert!(matches!(
            provider().parse_headers(&series, &TvdbAuth::default()),
            Err(ClientError::AuthenticationRequired(_))
        ));

        let auth = TvdbAuth {
            token: Some("jwt".into()),
        };
        let headers = provider().parse_headers(&series, &auth).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer jwt");
    }

    #[test]
    fn test_unwraps_success_envelope() {
        let body = json!({
            "status": "success",
            "data": [{"id": 1}, {"id": 2}],
            "links": {
                "prev": null,
                "self": "https://api4.thetvdb.com/v4/series?page=0",
                "next": "https://api4.thetvdb.com/v4/series?page=1",
                "total_items": 1000,
                "page_size": 500
            }
        });
        let response = Response::new("u", 200).with_json(&body);
        let parsed = provider()
            .parse_response(&Endpoint::get("/series").build(), response)
            .unwrap();

        assert_eq!(parsed.json_value().unwrap(), json!([{"id": 1}, {"id": 2}]));
        let pagination = parsed.pagination().unwrap();
        assert_eq!(pagination.item_count, Some(1000));
        assert_eq!(pagination.limit, Some(500));
        assert!(pagination.has_next());
    }

    #[test]
    fn test_failure_envelope() {
        let body = json!({"status": "failure", "message": "NotFoundException", "data": null});
        let response = Response::new("u", 404).with_json(&body);
        let err = provider()
            .parse_response(&Endpoint::get("/series/0").build(), response)
            .unwrap_err();
        assert!(
            matches!(err, ClientError::Envelope(value) if value["message"] == "NotFoundException")
        );
    }

    #[test]
    fn test_non_envelope_bodies() {
        let ok = Response::new("u", 200).with_body("plain");
        assert_eq!(
            provider()
                .parse_response(&Endpoint::get("/x").build(), ok)
                .unwrap()
                .body,
            "plain"
        );

        let unauthorized = Response::new("u", 401).with_json(&json!({"error": "x"}));
        let err = provider()
            .parse_response(&Endpoint::get("/x").build(), unauthorized)
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
