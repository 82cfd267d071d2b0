//! URL and body resolution for endpoint templates.
//!
//! [`resolve_url`] turns a template's URL pattern plus a parameter bag into a
//! concrete URL against a provider base; [`resolve_body`] picks the body fields
//! out of the same bag. Both fail before any network I/O when a required value
//! is missing.

use serde_json::{Map, Value};
use tracing::trace;
use traktor_core::params::is_blank_value;
use traktor_core::{BodyContract, Endpoint, Params};
use url::Url;

use crate::error::ClientError;

/// Resolves a template's URL pattern into a concrete URL.
///
/// `:name` path segments are replaced by their parameter; a missing optional
/// segment disappears entirely. Query keys take the parameter value or the
/// literal default from the pattern and are omitted when neither is present.
/// `conditions` activate [`traktor_core::ParamRequirement::RequiredWhen`]
/// requirements.
///
/// # Errors
///
/// Returns [`ClientError::MissingPathParameter`] or
/// [`ClientError::MissingQueryParameter`] for a missing required value, and
/// [`ClientError::InvalidTemplate`] if `base` cannot carry a path.
pub fn resolve_url<S: AsRef<str>>(
    template: &Endpoint,
    params: &Params,
    base: &Url,
    conditions: &[S],
) -> Result<Url, ClientError> {
    let contract = &template.opts().parameters;
    let mut url = base.clone();

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ClientError::InvalidTemplate(format!("{base} cannot be a base URL")))?;
        segments.pop_if_empty();

        for segment in template.path_pattern().split('/').filter(|s| !s.is_empty()) {
            let Some(name) = segment.strip_prefix(':') else {
                segments.push(segment);
                continue;
            };

            match params.text(name) {
                Some(value) => {
                    segments.push(&value);
                }
                None if contract.path_requirement(name).is_required(conditions) => {
                    return Err(ClientError::MissingPathParameter(name.to_string()));
                }
                None => {}
            }
        }
    }

    let mut pairs = Vec::new();
    for (key, default) in template.query_placeholders() {
        let value = params
            .text(key)
            .or_else(|| (!default.is_empty()).then(|| default.to_string()));

        match value {
            Some(value) => pairs.push((key, value)),
            None if contract.query_requirement(key).is_required(conditions) => {
                return Err(ClientError::MissingQueryParameter(key.to_string()));
            }
            None => {}
        }
    }

    if !pairs.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }

    trace!(template = template.url(), url = %url, "Resolved URL");
    Ok(url)
}

/// Builds the JSON body for a template's body contract.
///
/// Only keys named by the contract are copied; everything else in `params`
/// is dropped.
///
/// # Errors
///
/// Returns [`ClientError::MissingBodyParameter`] when a required field is
/// absent, null, or an empty string.
pub fn resolve_body(contract: &BodyContract, params: &Params) -> Result<String, ClientError> {
    let mut body = Map::new();
    for (name, _) in contract.fields() {
        if let Some(value) = params.get(name) {
            body.insert(name.to_string(), value.clone());
        }
    }

    if let Some(missing) = contract
        .required_fields()
        .find(|name| body.get(*name).is_none_or(is_blank_value))
    {
        return Err(ClientError::MissingBodyParameter(missing.to_string()));
    }

    Ok(serde_json::to_string(&Value::Object(body))?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NO_CONDITIONS: &[&str] = &[];

    fn base() -> Url {
        Url::parse("https://api.example.com").unwrap()
    }

    #[test]
    fn test_path_substitution() {
        let template = Endpoint::get("/a/:id/:opt")
            .required_path("id")
            .optional_path("opt")
            .build();

        let url = resolve_url(&template, &Params::new().with("id", "x"), &base(), NO_CONDITIONS)
            .unwrap();
        assert_eq!(url.path(), "/a/x");

        let err = resolve_url(&template, &Params::new(), &base(), NO_CONDITIONS).unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory path parameter: 'id'");
    }

    #[test]
    fn test_optional_segment_in_the_middle() {
        let template = Endpoint::get("/a/:opt/b").build();
        let url = resolve_url(&template, &Params::new(), &base(), NO_CONDITIONS).unwrap();
        assert_eq!(url.path(), "/a/b");
    }

    #[test]
    fn test_path_values_are_coerced() {
        let template = Endpoint::get("/shows/:id/seasons/:season/:flag").build();
        let params = Params::new()
            .with("id", 1390)
            .with("season", 0)
            .with("flag", true);

        let url = resolve_url(&template, &params, &base(), NO_CONDITIONS).unwrap();
        assert_eq!(url.path(), "/shows/1390/seasons/0/true");
    }

    #[test]
    fn test_base_with_version_path() {
        let base = Url::parse("https://api.themoviedb.org/3").unwrap();
        let template = Endpoint::get("/movie/:id").required_path("id").build();

        let url = resolve_url(&template, &Params::new().with("id", 550), &base, NO_CONDITIONS)
            .unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3/movie/550");
    }

    #[test]
    fn test_query_substitution() {
        let template = Endpoint::get("/search?q=&opt=").required_query("q").build();

        let url = resolve_url(&template, &Params::new().with("q", "v"), &base(), NO_CONDITIONS)
            .unwrap();
        assert_eq!(url.query(), Some("q=v"));

        let err = resolve_url(&template, &Params::new(), &base(), NO_CONDITIONS).unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory query parameter: 'q'");
    }

    #[test]
    fn test_query_default_and_object_values() {
        let template = Endpoint::get("/movies?extended=full&filter=").build();

        let url = resolve_url(&template, &Params::new(), &base(), NO_CONDITIONS).unwrap();
        assert_eq!(url.query(), Some("extended=full"));

        let params = Params::new().with("extended", "metadata").with("filter", json!({"a": 1}));
        let url = resolve_url(&template, &params, &base(), NO_CONDITIONS).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("extended".to_string(), "metadata".to_string()),
                ("filter".to_string(), r#"{"a":1}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_conditional_requirement() {
        let template = Endpoint::get("/users/:id/lists?limit=")
            .required_path("id")
            .query_when("limit", "vip")
            .build();
        let params = Params::new().with("id", "me");

        assert!(resolve_url(&template, &params, &base(), NO_CONDITIONS).is_ok());

        let err = resolve_url(&template, &params, &base(), &["vip"]).unwrap_err();
        assert!(matches!(err, ClientError::MissingQueryParameter(key) if key == "limit"));
    }

    #[test]
    fn test_body_contract() {
        let contract = BodyContract::new().field("a", true).field("b", false);

        let body = resolve_body(&contract, &Params::new().with("a", "1")).unwrap();
        assert_eq!(body, r#"{"a":"1"}"#);

        let err = resolve_body(&contract, &Params::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory body parameter: 'a'");
    }

    #[test]
    fn test_body_drops_unknown_keys_and_rejects_blanks() {
        let contract = BodyContract::new().field("a", true).field("b", false);

        let params = Params::new().with("a", 1).with("b", json!([1])).with("c", "x");
        let body: Value = serde_json::from_str(&resolve_body(&contract, &params).unwrap()).unwrap();
        assert_eq!(body, json!({"a": 1, "b": [1]}));

        assert!(resolve_body(&contract, &Params::new().with("a", "")).is_err());
        assert!(resolve_body(&contract, &Params::new().with("a", Value::Null)).is_err());
    }
}
