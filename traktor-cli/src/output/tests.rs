//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::{EndpointOutput, ResponseOutput};
    use super::super::text::TextFormatter;
    use chrono::Utc;
    use serde_json::json;
    use traktor_core::{CacheMetadata, CacheStamp, Pagination, Response};
    use traktor_providers::{ProviderRegistry, trakt_descriptor};

    fn trakt_endpoints(prefix: &str) -> Vec<EndpointOutput> {
        trakt_descriptor()
            .api()
            .endpoints()
            .into_iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, template)| EndpointOutput::new(path, template))
            .collect()
    }

    #[test]
    fn test_provider_lines() {
        let formatter = TextFormatter::new(false);
        assert!(formatter.format_providers_header().contains("Provider"));

        for desc in ProviderRegistry::all() {
            let line = formatter.format_provider_line(desc);
            assert!(line.starts_with(desc.cli_name()));
            assert!(line.contains(desc.metadata.default_endpoint));
        }
    }

    #[test]
    fn test_format_endpoints() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_endpoints("Trakt", &trakt_endpoints("sync.history"));

        assert!(output.starts_with("Trakt endpoints"));
        assert!(output.contains("sync.history.add"));
        assert!(output.contains("POST"));
        assert!(output.contains("/sync/history/remove"));
        assert!(output.contains("auth"));
        assert!(output.contains("Total: 3 endpoints"));
    }

    #[test]
    fn test_format_endpoints_flags() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_endpoints("Trakt", &trakt_endpoints("movies.trending"));
        assert!(output.contains("cached 1h"));
        assert!(output.contains("paged"));

        let output = formatter.format_endpoints("Trakt", &trakt_endpoints("sync.watchlist"));
        assert!(output.contains("requires limit when vip"));
    }

    #[test]
    fn test_format_response() {
        let formatter = TextFormatter::new(false);
        let mut response = Response::new("https://api.trakt.tv/movies/trending", 200)
            .with_json(&json!([{"watchers": 10}]));
        response.set_pagination(&Pagination {
            page: Some(1),
            page_count: Some(5),
            item_count: Some(100),
            ..Pagination::default()
        });

        let output = formatter.format_response(&ResponseOutput::new(&response, false));
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("HTTP 200 https://api.trakt.tv/movies/trending")
        );
        assert_eq!(lines.next(), Some("page 1/5, 100 items, more available"));
        assert!(output.contains("\"watchers\": 10"));
        assert!(!output.contains("Served from cache"));
    }

    #[test]
    fn test_format_cached_response() {
        let formatter = TextFormatter::new(false);
        let mut response = Response::new("https://api.trakt.tv/movies/1", 200).with_body("{}");
        response.cache = Some(CacheMetadata {
            previous: None,
            current: Some(CacheStamp {
                cached_at: Utc::now(),
                accessed_at: None,
            }),
            is_cache: true,
        });

        let output = formatter.format_response(&ResponseOutput::new(&response, false));
        assert!(output.contains("Served from cache (cached "));
    }

    #[test]
    fn test_format_response_with_headers_and_colors() {
        let formatter = TextFormatter::new(true);
        let response = Response::new("https://api.test/x", 404)
            .with_header("X-Request-Id", "abc")
            .with_body("not found");

        let output = formatter.format_response(&ResponseOutput::new(&response, true));
        assert!(output.contains("\x1b[31mHTTP 404"));
        assert!(output.contains("x-request-id"));
        assert!(output.ends_with("not found"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{EndpointOutput, JsonFormatter, ResponseOutput};
    use serde_json::{Value, json};
    use std::time::Duration;
    use traktor_core::{Endpoint, Response};
    use traktor_providers::ProviderRegistry;

    #[test]
    fn test_format_providers() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_providers(ProviderRegistry::all()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        let providers = value.as_array().unwrap();
        assert_eq!(providers.len(), 3);
        assert_eq!(providers[0]["cliName"], "trakt");
        assert_eq!(providers[1]["aliases"], json!(["themoviedb"]));
        assert!(providers[2]["endpointCount"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_endpoint_output() {
        let template = Endpoint::post("/sync/history/:type?limit=")
            .required_path("type")
            .query_when("limit", "vip")
            .body_field("movies", true)
            .body_field("shows", false)
            .retention(Duration::from_secs(60))
            .build();

        let output = EndpointOutput::new("sync.add".to_string(), &template);
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["method"], "POST");
        assert_eq!(value["auth"], "none");
        assert_eq!(value["cached"], true);
        assert_eq!(value["retentionSecs"], 60);
        assert_eq!(value["required"], json!(["type", "movies"]));
        assert_eq!(value["requiredWhen"], json!({"limit": "vip"}));
    }

    #[test]
    fn test_response_output() {
        let response = Response::new("https://api.test/x", 200)
            .with_header("x-pagination-page", "1")
            .with_json(&json!({"id": 7}));

        let compact = serde_json::to_value(ResponseOutput::new(&response, false)).unwrap();
        assert_eq!(compact["body"], json!({"id": 7}));
        assert_eq!(compact["fromCache"], false);
        assert!(compact.get("headers").is_none());

        let full = serde_json::to_value(ResponseOutput::new(&response, true)).unwrap();
        assert_eq!(full["headers"]["x-pagination-page"], "1");
    }
}
