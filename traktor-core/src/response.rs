//! Provider-neutral HTTP response.
//!
//! Provider response hooks may rewrite the body (e.g. to unwrap an envelope)
//! and attach extensions such as pagination. Cloning a [`Response`] copies
//! all of it, so cached copies keep those extensions.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Extension key under which pagination is stored.
pub const PAGINATION_EXTENSION: &str = "pagination";

// ============================================================================
// Cache Metadata
// ============================================================================

/// Timestamps of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStamp {
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
    /// When the entry was last served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at: Option<DateTime<Utc>>,
}

/// Cache information attached to responses returned by cached endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Entry that existed before this call, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<CacheStamp>,
    /// Entry now stored for this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CacheStamp>,
    /// True when the response was served from the cache.
    pub is_cache: bool,
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination details extracted by provider response hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Total number of pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Total number of items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    /// Link to the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl Pagination {
    /// Returns true if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if a further page exists.
    pub fn has_next(&self) -> bool {
        match (self.page, self.page_count) {
            (Some(page), Some(count)) => page < count,
            _ => self.next.is_some(),
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// An HTTP response as seen by callers of bound endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Final request URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lower-cased.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response body text.
    #[serde(default)]
    pub body: String,
    /// Provider-specific fields attached during response parsing.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    /// Cache information, set by cached endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheMetadata>,
}

impl Response {
    /// Creates an empty response.
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: String::new(),
            extensions: Map::new(),
            cache: None,
        }
    }

    /// Adds a header, builder style. The name is lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the body, builder style.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body, builder style.
    #[must_use]
    pub fn with_json(mut self, value: &Value) -> Self {
        self.body = value.to_string();
        self
    }

    /// Returns true for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Deserializes the body.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Parses the body as untyped JSON; an empty body is `null`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body is not JSON.
    pub fn json_value(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body)
    }

    /// Returns a provider extension.
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Sets a provider extension.
    pub fn set_extension(&mut self, key: impl Into<String>, value: Value) {
        self.extensions.insert(key.into(), value);
    }

    /// Pagination attached by the provider, if any.
    pub fn pagination(&self) -> Option<Pagination> {
        self.extension(PAGINATION_EXTENSION)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Attaches pagination; empty pagination is not stored.
    pub fn set_pagination(&mut self, pagination: &Pagination) {
        if pagination.is_empty() {
            return;
        }
        if let Ok(value) = serde_json::to_value(pagination) {
            self.set_extension(PAGINATION_EXTENSION, value);
        }
    }

    /// Returns true if the response was served from a cache.
    pub fn is_cache(&self) -> bool {
        self.cache.as_ref().is_some_and(|c| c.is_cache)
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
    fn test_header_case_insensitive() {
        let response = Response::new("https://api.trakt.tv/movies", 200)
            .with_header("X-Pagination-Page", "2");
        assert_eq!(response.header("x-pagination-page"), Some("2"));
        assert_eq!(response.header("X-PAGINATION-PAGE"), Some("2"));
    }

    #[test]
    fn test_ok_range() {
        assert!(Response::new("u", 204).ok());
        assert!(!Response::new("u", 301).ok());
        assert!(!Response::new("u", 404).ok());
    }

    #[test]
    fn test_pagination_extension_survives_clone() {
        let mut response = Response::new("u", 200).with_json(&json!([1, 2, 3]));
        response.set_pagination(&Pagination {
            page: Some(1),
            page_count: Some(3),
            ..Default::default()
        });

        let copy = response.clone();
        let pagination = copy.pagination().unwrap();
        assert_eq!(pagination.page, Some(1));
        assert!(pagination.has_next());
        assert_eq!(copy.json::<Vec<u32>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_pagination_not_stored() {
        let mut response = Response::new("u", 200);
        response.set_pagination(&Pagination::default());
        assert!(response.extensions.is_empty());
    }

    #[test]
    fn test_json_value_empty_body() {
        let response = Response::new("u", 204);
        assert_eq!(response.json_value().unwrap(), Value::Null);
    }
}
