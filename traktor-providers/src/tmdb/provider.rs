//! TMDB request and response hooks.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use traktor_core::{AuthRequirement, Endpoint, Pagination, Params, ProviderKind, Response};
use traktor_fetch::client::header_value;
use traktor_fetch::{ClientError, Provider, resolve_url};
use url::Url;

use crate::api_client::KnownProvider;
use crate::error::{ProviderError, parse_endpoint};

/// Production API base URL.
pub const TMDB_API_URL: &str = "https://api.themoviedb.org/3";

/// Query parameter carrying the user session.
pub const SESSION_PARAM: &str = "session_id";

/// Application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbConfig {
    /// API read access token, sent as a bearer token.
    pub read_token: String,
    /// API base URL.
    pub endpoint: String,
}

impl TmdbConfig {
    /// Creates a configuration against the production API.
    pub fn new(read_token: impl Into<String>) -> Self {
        Self {
            read_token: read_token.into(),
            endpoint: TMDB_API_URL.to_string(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// User authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmdbAuth {
    /// Session id from the v3 authentication flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Account id, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,
}

impl TmdbAuth {
    /// Auth holding only a session id.
    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            account_id: None,
        }
    }
}

/// Error body returned by TMDB.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbErrorEnvelope {
    /// TMDB status code (not the HTTP status).
    pub status_code: i64,
    /// Message.
    pub status_message: String,
    /// Present on write endpoints.
    #[serde(default)]
    pub success: Option<bool>,
}

/// TMDB provider hooks.
#[derive(Debug)]
pub struct TmdbProvider {
    read_token: String,
    endpoint: Url,
}

impl TmdbProvider {
    /// Creates the provider.
    ///
    /// # Errors
    ///
    /// Fails on an empty read token or an unparsable endpoint.
    pub fn new(config: &TmdbConfig) -> Result<Self, ProviderError> {
        if config.read_token.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: ProviderKind::Tmdb,
                field: "read_token",
            });
        }
        Ok(Self {
            read_token: config.read_token.clone(),
            endpoint: parse_endpoint(&config.endpoint)?,
        })
    }
}

impl KnownProvider for TmdbProvider {
    const KIND: ProviderKind = ProviderKind::Tmdb;
}

impl Provider for TmdbProvider {
    type Auth = TmdbAuth;

    fn name(&self) -> &str {
        "tmdb"
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn parse_url(
        &self,
        template: &Endpoint,
        params: &Params,
        auth: &TmdbAuth,
    ) -> Result<Url, ClientError> {
        let mut url = resolve_url(template, params, self.endpoint(), &self.conditions(auth))?;
        if template.opts().auth != AuthRequirement::None {
            if let Some(session) = auth.session_id.as_deref() {
                url.query_pairs_mut().append_pair(SESSION_PARAM, session);
            }
        }
        Ok(url)
    }

    fn parse_headers(
        &self,
        template: &Endpoint,
        auth: &TmdbAuth,
    ) -> Result<HeaderMap, ClientError> {
        if template.opts().auth == AuthRequirement::Required && auth.session_id.is_none() {
            return Err(ClientError::AuthenticationRequired(template.signature()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=utf-8"));
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", self.read_token))?);
        Ok(headers)
    }

    fn parse_response(
        &self,
        _template: &Endpoint,
        mut response: Response,
    ) -> Result<Response, ClientError> {
        let body = response.json_value().ok();

        if let Some(envelope) = body.as_ref().and_then(error_envelope) {
            if !response.ok() || envelope.success == Some(false) {
                return Err(ClientError::Envelope(body.unwrap_or_default()));
            }
        }
        if !response.ok() {
            return Err(ClientError::Response(Box::new(response)));
        }

        if let Some(body) = body {
            response.set_pagination(&pagination_from_body(&body));
        }
        Ok(response)
    }
}

fn error_envelope(body: &Value) -> Option<TmdbErrorEnvelope> {
    serde_json::from_value(body.clone()).ok()
}

/// Reads `page`, `total_pages` and `total_results` from a list body.
pub fn pagination_from_body(body: &Value) -> Pagination {
    let number = |key: &str| body.get(key).and_then(Value::as_u64);
    let small = |key: &str| number(key).and_then(|v| u32::try_from(v).ok());

    Pagination {
        page: small("page"),
        page_count: small("total_pages"),
        item_count: number("total_results"),
        ..Pagination::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> TmdbProvider {
        TmdbProvider::new(&TmdbConfig::new("read")).unwrap()
    }

    #[test]
    fn test_read_token_on_every_request() {
        let headers = provider()
            .parse_headers(&Endpoint::get("/configuration").build(), &TmdbAuth::default())
            .unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer read");
    }

    #[test]
    fn test_session_appended_on_auth_endpoints() {
        let provider = provider();
        let auth = TmdbAuth::with_session("s3ss");
        let params = Params::new().with("account_id", 7);

        let account = Endpoint::get("/account/:account_id")
            .required_path("account_id")
            .auth(AuthRequirement::Required)
            .build();
        let url = provider.parse_url(&account, &params, &auth).unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3/account/7?session_id=s3ss");

        let public = Endpoint::get("/movie/:id?language=").required_path("id").build();
        let url = provider
            .parse_url(&public, &Params::new().with("id", 550), &auth)
            .unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3/movie/550");
    }

    #[test]
    fn test_required_session() {
        let account = Endpoint::get("/account/:account_id")
            .auth(AuthRequirement::Required)
            .build();
        let err = provider()
            .parse_headers(&account, &TmdbAuth::default())
            .unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationRequired(_)));
    }

    #[test]
    fn test_error_envelope() {
        let body = json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found.",
            "success": false
        });
        let response = Response::new("u", 404).with_json(&body);
        let err = provider()
            .parse_response(&Endpoint::get("/movie/0").build(), response)
            .unwrap_err();
        assert!(matches!(err, ClientError::Envelope(value) if value["status_code"] == 34));
    }

    #[test]
    fn test_success_envelope_passes() {
        let body = json!({"status_code": 1, "status_message": "Success.", "success": true});
        let response = Response::new("u", 201).with_json(&body);
        assert!(
            provider()
                .parse_response(&Endpoint::post("/movie/550/rating").build(), response)
                .is_ok()
        );
    }

    #[test]
    fn test_non_json_error_is_raw_response() {
        let response = Response::new("u", 502).with_body("<html>bad gateway</html>");
        let err = provider()
            .parse_response(&Endpoint::get("/movie/1").build(), response)
            .unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_body_pagination() {
        let body = json!({"page": 1, "results": [], "total_pages": 500, "total_results": 10000});
        let response = Response::new("u", 200).with_json(&body);
        let parsed = provider()
            .parse_response(&Endpoint::get("/movie/popular").build(), response)
            .unwrap();
        let pagination = parsed.pagination().unwrap();
        assert_eq!(pagination.page, Some(1));
        assert_eq!(pagination.page_count, Some(500));
        assert_eq!(pagination.item_count, Some(10000));
    }
}
