//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use traktor_core::{AuthRequirement, Endpoint, Namespace, Response};
use traktor_fetch::{ClientContext, ClientError, HttpRequest, Provider, Transport};
use traktor_store::MemoryCacheStore;
use url::Url;

// ============================================================================
// Mock Transport
// ============================================================================

type Responder = Box<dyn Fn(&HttpRequest) -> Result<Response, ClientError> + Send + Sync>;

/// Transport that records requests and answers from a closure.
pub struct MockTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
    responder: Mutex<Responder>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Answers every request with `200` and a JSON echo of the URL.
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            responder: Mutex::new(Box::new(|request: &HttpRequest| {
                let body = serde_json::json!({ "url": request.url.as_str() });
                Ok(Response::new(request.url.as_str(), 200).with_json(&body))
            })),
            delay: None,
        }
    }

    /// Waits before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replaces the responder.
    pub fn respond_with(
        &self,
        responder: impl Fn(&HttpRequest) -> Result<Response, ClientError> + Send + Sync + 'static,
    ) {
        *self.responder.lock().unwrap() = Box::new(responder);
    }

    /// Answers every request with the given status.
    pub fn respond_status(&self, status: u16) {
        self.respond_with(move |request| Ok(Response::new(request.url.as_str(), status)));
    }

    /// Number of requests sent.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<Response, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let responder = self.responder.lock().unwrap();
        responder(&request)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Test Provider
// ============================================================================

/// Authentication record of the test provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestAuth {
    pub token: Option<String>,
    pub vip: bool,
}

/// Provider with bearer auth and a `vip` condition.
pub struct TestProvider {
    endpoint: Url,
}

impl TestProvider {
    pub fn new() -> Self {
        Self::with_endpoint("https://api.test.local/v2")
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: Url::parse(endpoint).unwrap(),
        }
    }
}

impl Provider for TestProvider {
    type Auth = TestAuth;

    fn name(&self) -> &str {
        "test"
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn conditions(&self, auth: &TestAuth) -> Vec<String> {
        if auth.vip {
            vec!["vip".to_string()]
        } else {
            Vec::new()
        }
    }

    fn parse_headers(
        &self,
        template: &Endpoint,
        auth: &TestAuth,
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match (template.opts().auth, auth.token.as_deref()) {
            (AuthRequirement::Required, None) => {
                return Err(ClientError::AuthenticationRequired(template.signature()));
            }
            (AuthRequirement::Required | AuthRequirement::Optional, Some(token)) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
                headers.insert(AUTHORIZATION, value);
            }
            _ => {}
        }

        Ok(headers)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A small nested API.
pub fn test_api() -> Namespace {
    Namespace::new()
        .endpoint("ping", Endpoint::get("/ping"))
        .namespace(
            "movies",
            Namespace::new()
                .endpoint(
                    "summary",
                    Endpoint::get("/movies/:id?extended=")
                        .required_path("id")
                        .optional_query("extended")
                        .cached(),
                )
                .endpoint(
                    "popular",
                    Endpoint::get("/movies/popular?page=&limit=")
                        .query_when("limit", "vip")
                        .paginated(),
                ),
        )
        .namespace(
            "sync",
            Namespace::new().namespace(
                "history",
                Namespace::new()
                    .endpoint(
                        "add",
                        Endpoint::post("/sync/history")
                            .body_field("movies", true)
                            .body_field("shows", false)
                            .auth(AuthRequirement::Required)
                            .header("x-template", "1"),
                    )
                    .endpoint(
                        "get",
                        Endpoint::get("/sync/history/:type")
                            .optional_path("type")
                            .auth(AuthRequirement::Required)
                            .cache(traktor_core::CachePolicy::Detailed {
                                retention: None,
                                evict_on_error: Some(true),
                            }),
                    ),
            ),
        )
}

/// Context over a mock transport and a fresh memory store.
pub fn test_context(transport: Arc<MockTransport>) -> (ClientContext, Arc<MemoryCacheStore>) {
    let store = Arc::new(MemoryCacheStore::new());
    let context = ClientContext::builder(store.clone())
        .transport(transport)
        .build()
        .unwrap();
    (context, store)
}
