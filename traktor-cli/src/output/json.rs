//! JSON output formatting.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use traktor_core::{AuthRequirement, Endpoint, Pagination, ParamRequirement, Response};
use traktor_providers::ProviderDescriptor;

// ============================================================================
// Output Types
// ============================================================================

/// Provider info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfoOutput {
    pub id: String,
    pub display_name: String,
    pub cli_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub endpoint: String,
    pub auth: String,
    pub docs_url: String,
    pub endpoint_count: usize,
}

/// One endpoint of a provider's tree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointOutput {
    pub path: String,
    pub method: String,
    pub url: String,
    pub auth: AuthRequirement,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_secs: Option<u64>,
    pub paginated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub required_when: BTreeMap<String, String>,
}

impl EndpointOutput {
    /// Describes a template found at `path`.
    pub fn new(path: String, template: &Endpoint) -> Self {
        let opts = template.opts();
        let mut required = Vec::new();
        let mut required_when = BTreeMap::new();

        let contract = opts.parameters.path.iter().chain(&opts.parameters.query);
        for (name, requirement) in contract {
            match requirement {
                ParamRequirement::Required => required.push(name.clone()),
                ParamRequirement::RequiredWhen(condition) => {
                    required_when.insert(name.clone(), condition.clone());
                }
                ParamRequirement::Optional => {}
            }
        }
        if let Some(body) = template.body() {
            required.extend(body.required_fields().map(str::to_string));
        }

        Self {
            path,
            method: template.method().as_str().to_string(),
            url: template.url().to_string(),
            auth: opts.auth,
            cached: opts.cache.is_enabled(),
            retention_secs: opts.cache.retention().map(|r| r.as_secs()),
            paginated: opts.pagination,
            required,
            required_when,
        }
    }
}

/// A call's response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOutput {
    pub url: String,
    pub status: u16,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub body: Value,
}

impl ResponseOutput {
    /// Converts a response; a body that is not JSON becomes a string.
    pub fn new(response: &Response, include_headers: bool) -> Self {
        let body = response
            .json_value()
            .unwrap_or_else(|_| Value::String(response.body.clone()));

        Self {
            url: response.url.clone(),
            status: response.status,
            from_cache: response.is_cache(),
            cached_at: response
                .cache
                .as_ref()
                .and_then(|cache| cache.current)
                .map(|stamp| stamp.cached_at),
            headers: if include_headers {
                response.headers.clone()
            } else {
                BTreeMap::new()
            },
            pagination: response.pagination(),
            body,
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats provider list.
    pub fn format_providers(&self, providers: &[ProviderDescriptor]) -> Result<String> {
        let outputs: Vec<ProviderInfoOutput> = providers
            .iter()
            .map(|desc| ProviderInfoOutput {
                id: desc.cli_name().to_string(),
                display_name: desc.display_name().to_string(),
                cli_name: desc.cli_name().to_string(),
                aliases: desc.cli.aliases.iter().map(|a| (*a).to_string()).collect(),
                endpoint: desc.metadata.default_endpoint.to_string(),
                auth: desc.metadata.auth_scheme.to_string(),
                docs_url: desc.metadata.docs_url.to_string(),
                endpoint_count: desc.api().endpoints().len(),
            })
            .collect();

        self.format(&outputs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_response_output_non_json_body() {
        let response = Response::new("https://api.test/x", 200).with_body("plain text");
        let output = ResponseOutput::new(&response, false);
        assert_eq!(output.body, json!("plain text"));
        assert!(!output.from_cache);
        assert!(output.cached_at.is_none());

        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("cachedAt").is_none());
        assert!(value.get("headers").is_none());
    }
}
