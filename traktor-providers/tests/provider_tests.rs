//! Provider clients against a local mock server.

use std::sync::Arc;

use serde_json::json;
use traktor_core::{Params, ProviderKind, RequestInit};
use traktor_fetch::{CacheOptions, ClientContext, ClientError};
use traktor_providers::{
    ApiClient, ProviderError, TmdbAuth, TmdbClient, TmdbConfig, TraktAuth, TraktClient,
    TraktConfig, TvdbClient, TvdbConfig,
};
use traktor_store::MemoryCacheStore;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context() -> ClientContext {
    ClientContext::new(Arc::new(MemoryCacheStore::new())).unwrap()
}

// ============================================================================
// Trakt
// ============================================================================

#[tokio::test]
async fn test_trakt_trending_with_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/trending"))
        .and(query_param("limit", "2"))
        .and(header("trakt-api-version", "2"))
        .and(header("trakt-api-key", "client"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-pagination-page", "1")
                .insert_header("x-pagination-page-count", "9")
                .set_body_json(json!([{"watchers": 10}, {"watchers": 8}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = TraktConfig::new("client").with_endpoint(server.uri());
    let trakt = TraktClient::new(&config, &context()).unwrap();

    let cached = trakt.endpoint("movies.trending").unwrap().cached().unwrap();
    let params = Params::new().with("limit", 2);
    let first = cached
        .call(params.clone(), RequestInit::new(), CacheOptions::default())
        .await
        .unwrap();
    let second = cached
        .call(params, RequestInit::new(), CacheOptions::default())
        .await
        .unwrap();

    assert!(second.is_cache());
    assert_eq!(first.body, second.body);
    let pagination = second.pagination().unwrap();
    assert_eq!(pagination.page_count, Some(9));
}

#[tokio::test]
async fn test_trakt_authenticated_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sync/history"))
        .and(header("authorization", "Bearer user-token"))
        .and(body_json(json!({"movies": [{"ids": {"trakt": 28}}]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"added": {"movies": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TraktConfig::new("client").with_endpoint(server.uri());
    let trakt = TraktClient::new(&config, &context()).unwrap();
    let add = trakt.endpoint("sync.history.add").unwrap();
    let params = Params::new().with("movies", json!([{"ids": {"trakt": 28}}]));

    let err = add.call(params.clone(), RequestInit::new()).unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationRequired(_)));

    trakt.set_auth(TraktAuth::with_token("user-token"));
    let response = add.call(params, RequestInit::new()).unwrap().await.unwrap();
    assert_eq!(response.json_value().unwrap()["added"]["movies"], 1);
}

// ============================================================================
// TMDB
// ============================================================================

#[tokio::test]
async fn test_tmdb_session_and_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account/1"))
        .and(query_param("session_id", "abc"))
        .and(header("authorization", "Bearer read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": "me"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/0"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;

    let config = TmdbConfig::new("read").with_endpoint(server.uri());
    let tmdb = TmdbClient::with_auth(&config, &context(), TmdbAuth::default()).unwrap();
    tmdb.set_session("abc");

    let account = tmdb
        .endpoint("account.details")
        .unwrap()
        .call(Params::new().with("account_id", 1), RequestInit::new())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(account.json_value().unwrap()["username"], "me");

    let err = tmdb
        .endpoint("movies.details")
        .unwrap()
        .call(Params::new().with("id", 0), RequestInit::new())
        .unwrap()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Envelope(body) if body["status_code"] == 34));
}

// ============================================================================
// TVDB
// ============================================================================

#[tokio::test]
async fn test_tvdb_login_then_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"apikey": "key", "pin": "1234"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"token": "jwt"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/81189"))
        .and(header("authorization", "Bearer jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"id": 81189, "name": "Breaking Bad"}
        })))
        .mount(&server)
        .await;

    let config = TvdbConfig::new("key")
        .with_pin("1234")
        .with_endpoint(server.uri());
    let tvdb = TvdbClient::new(&config, &context()).unwrap();
    assert!(!tvdb.is_logged_in());

    assert_eq!(tvdb.login().await.unwrap(), "jwt");
    assert!(tvdb.is_logged_in());

    let series = tvdb
        .endpoint("series.base")
        .unwrap()
        .call(Params::new().with("id", 81189), RequestInit::new())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(series.json_value().unwrap()["name"], "Breaking Bad");
}

#[tokio::test]
async fn test_tvdb_login_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {}
        })))
        .mount(&server)
        .await;

    let config = TvdbConfig::new("key").with_endpoint(server.uri());
    let tvdb = TvdbClient::new(&config, &context()).unwrap();
    assert!(matches!(tvdb.login().await, Err(ProviderError::NoToken)));
}

// ============================================================================
// Dynamic Clients
// ============================================================================

#[tokio::test]
async fn test_dynamic_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/tron-legacy-2010"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "TRON: Legacy"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TraktConfig::new("client").with_endpoint(server.uri());
    let client: Arc<dyn ApiClient> = TraktClient::new(&config, &context()).unwrap().into_dyn();
    assert_eq!(client.kind(), ProviderKind::Trakt);

    let params = Params::new().with("id", "tron-legacy-2010");
    let url = client.resolve("movies.summary", params.clone()).unwrap();
    assert_eq!(url.path(), "/movies/tron-legacy-2010");

    for _ in 0..2 {
        let response = client
            .call_cached(
                "movies.summary",
                params.clone(),
                RequestInit::new(),
                CacheOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(response.json_value().unwrap()["title"], "TRON: Legacy");
    }

    assert!(client.evict("movies.summary").await.unwrap().is_some());
    assert_eq!(client.clear_cache(None, false).await.unwrap(), 0);

    assert!(matches!(
        client.call("movies.nope", Params::new(), RequestInit::new()).await,
        Err(ProviderError::UnknownEndpoint(_))
    ));
    assert!(matches!(
        client
            .call_cached(
                "sync.history.add",
                Params::new(),
                RequestInit::new(),
                CacheOptions::default(),
            )
            .await,
        Err(ProviderError::NotCacheable(_))
    ));
}
