//! Tests for the reqwest transport against a local mock server.

mod common;

use std::sync::Arc;

use common::{TestAuth, TestProvider, test_api};
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::json;
use traktor_core::{HttpMethod, Params, RequestInit};
use traktor_fetch::{
    BaseClient, CacheOptions, ClientContext, HttpRequest, ReqwestTransport, Transport,
};
use traktor_store::MemoryCacheStore;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_send_returns_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/popular"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Pagination-Page", "2")
                .set_body_json(json!([{"title": "Dune"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let url = Url::parse(&format!("{}/movies/popular", server.uri())).unwrap();
    let mut request = HttpRequest::new(HttpMethod::Get, url);
    request
        .headers
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let response = transport.send(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.ok());
    assert_eq!(response.header("x-pagination-page"), Some("2"));
    assert_eq!(response.json_value().unwrap()[0]["title"], "Dune");
}

#[tokio::test]
async fn test_send_passes_error_status_through() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/list/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let url = Url::parse(&format!("{}/list/1", server.uri())).unwrap();
    let response = transport
        .send(HttpRequest::new(HttpMethod::Delete, url))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
    assert!(!response.ok());
    assert_eq!(response.body, "missing");
}

#[tokio::test]
async fn test_disallowed_domain_is_rejected() {
    let server = MockServer::start().await;
    let transport = ReqwestTransport::new()
        .unwrap()
        .with_allowed_domains(vec!["trakt.tv".to_string()]);
    let url = Url::parse(&format!("{}/ping", server.uri())).unwrap();

    let err = transport
        .send(HttpRequest::new(HttpMethod::Get, url))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "domain not allowed: 127.0.0.1");
}

#[tokio::test]
async fn test_client_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/sync/history"))
        .and(header("authorization", "Bearer token"))
        .and(header("x-template", "1"))
        .and(body_json(json!({"movies": [{"ids": {"trakt": 1}}]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"added": {"movies": 1}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/movies/dune"))
        .and(query_param("extended", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Dune"})))
        .expect(1)
        .mount(&server)
        .await;

    let context = ClientContext::new(Arc::new(MemoryCacheStore::new())).unwrap();
    let client = BaseClient::with_auth(
        TestProvider::with_endpoint(&format!("{}/v2", server.uri())),
        &test_api(),
        &context,
        TestAuth {
            token: Some("token".to_string()),
            vip: false,
        },
    );

    let added = client
        .endpoint("sync.history.add")
        .unwrap()
        .call(
            Params::new().with("movies", json!([{"ids": {"trakt": 1}}])),
            RequestInit::new(),
        )
        .unwrap()
        .await
        .unwrap();
    assert_eq!(added.status, 201);

    let summary = client.endpoint("movies.summary").unwrap().cached().unwrap();
    let params = Params::new().with("id", "dune").with("extended", "full");
    for _ in 0..2 {
        let response = summary
            .call(params.clone(), RequestInit::new(), CacheOptions::default())
            .await
            .unwrap();
        assert_eq!(response.json_value().unwrap()["title"], "Dune");
    }
}
