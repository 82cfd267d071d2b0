//! HTTP transport.
//!
//! The client framework talks to the network only through the [`Transport`]
//! trait. [`ReqwestTransport`] is the default implementation and adds:
//! - Request/response tracing
//! - An optional domain allowlist
//! - A fixed user agent and optional timeout from [`ClientSettings`]

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Map;
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use traktor_core::{HttpMethod, Response};
use url::Url;

use crate::context::ClientSettings;
use crate::error::ClientError;

// ============================================================================
// Request
// ============================================================================

/// A fully resolved outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends requests and returns provider-neutral responses.
///
/// Non-success statuses are returned as responses, not errors; deciding what
/// counts as a failure is up to the provider's response hook. Dropping the
/// returned future must abort the request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request.
    async fn send(&self, request: HttpRequest) -> Result<Response, ClientError>;

    /// Name of this transport for logging.
    fn name(&self) -> &str {
        "transport"
    }
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_settings(&ClientSettings::default())
    }

    /// Creates a transport from client settings.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn with_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            allowed_domains: settings.allowed_domains.clone(),
        })
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self {
            inner: client,
            allowed_domains: None,
        }
    }

    /// Restricts requests to the given domains and their subdomains.
    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &Url) -> Result<(), ClientError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let host = url
            .host_str()
            .ok_or_else(|| ClientError::InvalidTemplate(format!("no host in URL {url}")))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(ClientError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Returns the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<Response, ClientError> {
        self.is_domain_allowed(&request.url)?;
        debug!("Sending request");

        let mut builder = self
            .inner
            .request(to_reqwest_method(request.method), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Response received");

        Ok(Response {
            url,
            status,
            headers,
            body,
            extensions: Map::new(),
            cache: None,
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

// ============================================================================
// Tests
// ============================================================================
