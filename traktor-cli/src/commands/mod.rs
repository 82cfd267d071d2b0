//! CLI command implementations.

pub mod cache;
pub mod call;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod providers;
pub mod resolve;

use anyhow::Result;
use serde_json::Value;
use traktor_core::{Params, RequestInit};
use traktor_providers::{ProviderDescriptor, ProviderRegistry};

// ============================================================================
// Argument Helpers
// ============================================================================

/// Parses a `KEY=VALUE` argument.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Interprets a parameter value: valid JSON is taken as-is, anything else
/// is a string.
pub fn param_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Builds call parameters from `KEY=VALUE` pairs.
pub fn build_params(pairs: &[(String, String)]) -> Params {
    pairs
        .iter()
        .fold(Params::new(), |params, (key, value)| {
            params.with(key.as_str(), param_value(value))
        })
}

/// Builds request overrides from `NAME=VALUE` header pairs.
pub fn build_init(pairs: &[(String, String)]) -> RequestInit {
    pairs
        .iter()
        .fold(RequestInit::new(), |init, (name, value)| {
            init.header(name.as_str(), value.as_str())
        })
}

/// Looks up a provider by CLI name or alias.
pub fn find_provider(name: &str) -> Result<&'static ProviderDescriptor> {
    ProviderRegistry::get_by_cli_name(name).ok_or_else(|| {
        let known: Vec<_> = ProviderRegistry::all().iter().map(|d| d.cli_name()).collect();
        anyhow::anyhow!("Unknown provider: {name} (expected one of: {})", known.join(", "))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use traktor_core::ProviderKind;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("id=tron-legacy-2010").unwrap(),
            ("id".to_string(), "tron-legacy-2010".to_string())
        );
        assert_eq!(
            parse_key_value("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_key_value("empty=").unwrap().1, "");
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_param_value() {
        assert_eq!(param_value("550"), json!(550));
        assert_eq!(param_value("true"), json!(true));
        assert_eq!(param_value("tron"), json!("tron"));
        assert_eq!(param_value(r#""550""#), json!("550"));
        assert_eq!(
            param_value(r#"[{"ids":{"trakt":28}}]"#),
            json!([{"ids": {"trakt": 28}}])
        );
    }

    #[test]
    fn test_build_params_and_init() {
        let pairs = vec![
            ("id".to_string(), "550".to_string()),
            ("language".to_string(), "en-US".to_string()),
        ];
        let params = build_params(&pairs);
        assert_eq!(params.get("id"), Some(&json!(550)));
        assert_eq!(params.get("language"), Some(&json!("en-US")));

        let init = build_init(&[("x-trace".to_string(), "1".to_string())]);
        assert_eq!(init.headers.get("x-trace").map(String::as_str), Some("1"));
        assert!(build_init(&[]).is_empty());
    }

    #[test]
    fn test_find_provider() {
        assert_eq!(find_provider("trakt").unwrap().id, ProviderKind::Trakt);
        assert_eq!(find_provider("TheMovieDB").unwrap().id, ProviderKind::Tmdb);
        let err = find_provider("imdb").unwrap_err().to_string();
        assert!(err.contains("imdb"));
        assert!(err.contains("tvdb"));
    }
}
