//! Cache decorator for endpoint calls.
//!
//! [`with_cache`] wraps any call function with a get-or-populate cache:
//!
//! 1. Compute the key from the call's parameters and init.
//! 2. Unless the call forces a refresh, serve a stored entry while it is
//!    fresh. Retention resolves per call, then per template, then from the
//!    store; with none of them set, entries never expire.
//! 3. Otherwise run the call, store the response, and annotate it with the
//!    previous and current entry stamps.
//! 4. On failure, optionally delete the entry, then return the error.
//!
//! Concurrent misses on the same key are not collapsed: both calls go out
//! and the last write wins.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use traktor_core::{
    CacheEntry, CacheMetadata, CacheStore, Endpoint, Params, RequestInit, Response,
};
use url::Url;

use crate::error::ClientError;
use crate::request::CancellableRequest;

/// A call function the cache can wrap.
pub type CallFn = Arc<dyn Fn(Params, RequestInit) -> CancellableRequest<Response> + Send + Sync>;

// ============================================================================
// Cache Key
// ============================================================================

/// How a cache key is derived for a call.
#[derive(Clone)]
pub enum CacheKey {
    /// The same key for every call.
    Fixed(String),
    /// A key computed from the call's parameters and init.
    Derived(Arc<dyn Fn(&Params, &RequestInit) -> String + Send + Sync>),
}

impl CacheKey {
    /// Creates a derived key.
    pub fn derived(f: impl Fn(&Params, &RequestInit) -> String + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    /// Computes the key for a call.
    pub fn resolve(&self, params: &Params, init: &RequestInit) -> String {
        match self {
            Self::Fixed(key) => key.clone(),
            Self::Derived(f) => f(params, init),
        }
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(key) => f.debug_tuple("Fixed").field(key).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::Fixed(key.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self::Fixed(key)
    }
}

/// Key prefix shared by every entry of one provider, whatever its host.
pub fn provider_key_prefix(provider: &str) -> String {
    format!("{provider}@")
}

/// Key namespace of one provider talking to one API base URL.
///
/// Clients sharing a store only see each other's entries when both the
/// provider and the base URL match.
pub fn cache_namespace(provider: &str, base: &Url) -> String {
    format!("{}{base}|", provider_key_prefix(provider))
}

/// Key prefix shared by every call of an endpoint within `namespace`.
///
/// Built from the namespace, method, URL pattern and serialized template,
/// with object keys sorted so the prefix is stable across builds.
pub fn endpoint_key_prefix(namespace: &str, template: &Endpoint) -> String {
    let config = serde_json::to_value(template)
        .map(|value| canonical_json(&value))
        .unwrap_or_default();
    format!("{namespace}{} {}|{}|", template.method(), template.url(), config)
}

/// Lookup key (prefix plus parameters and init) and eviction key (the
/// prefix alone) for an endpoint.
///
/// Clearing the eviction key as a pattern removes every cached variant of
/// the endpoint.
pub fn endpoint_keys(namespace: &str, template: &Endpoint) -> (CacheKey, CacheKey) {
    let prefix = endpoint_key_prefix(namespace, template);
    let lookup_prefix = prefix.clone();
    let key = CacheKey::derived(move |params, init| {
        let params = serde_json::to_value(params)
            .map(|v| canonical_json(&v))
            .unwrap_or_default();
        let init = serde_json::to_value(init)
            .map(|v| canonical_json(&v))
            .unwrap_or_default();
        format!("{lookup_prefix}{params}|{init}")
    });
    (key, CacheKey::Fixed(prefix))
}

/// Serializes JSON with object keys in sorted order.
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration of a cached call.
#[derive(Clone)]
pub struct CacheConfig {
    /// Lookup key.
    pub key: CacheKey,
    /// Key (or pattern) cleared by [`CachedCall::evict`]; defaults to `key`.
    pub eviction_key: Option<CacheKey>,
    /// Backing store.
    pub store: Arc<dyn CacheStore>,
    /// Template-level retention.
    pub retention: Option<Duration>,
    /// Template-level evict-on-error flag.
    pub evict_on_error: Option<bool>,
}

impl CacheConfig {
    /// Creates a configuration with no template-level policy.
    pub fn new(key: impl Into<CacheKey>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            key: key.into(),
            eviction_key: None,
            store,
            retention: None,
            evict_on_error: None,
        }
    }

    /// Sets the eviction key.
    #[must_use]
    pub fn with_eviction_key(mut self, key: impl Into<CacheKey>) -> Self {
        self.eviction_key = Some(key.into());
        self
    }

    /// Sets the template-level retention.
    #[must_use]
    pub fn with_retention(mut self, retention: Option<Duration>) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the template-level evict-on-error flag.
    #[must_use]
    pub fn with_evict_on_error(mut self, evict: Option<bool>) -> Self {
        self.evict_on_error = evict;
        self
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("key", &self.key)
            .field("eviction_key", &self.eviction_key)
            .field("store", &self.store.name())
            .field("retention", &self.retention)
            .field("evict_on_error", &self.evict_on_error)
            .finish()
    }
}

/// Per-call cache overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Skip the lookup and always call through.
    pub force: bool,
    /// Retention for this call only.
    pub retention: Option<Duration>,
    /// Evict-on-error flag for this call only.
    pub evict_on_error: Option<bool>,
}

impl CacheOptions {
    /// Options forcing a refresh.
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    /// Sets the per-call retention.
    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Sets the per-call evict-on-error flag.
    #[must_use]
    pub fn with_evict_on_error(mut self, evict: bool) -> Self {
        self.evict_on_error = Some(evict);
        self
    }
}

// ============================================================================
// Cached Call
// ============================================================================

/// Wraps a call function with a cache.
pub fn with_cache(call: CallFn, config: CacheConfig) -> CachedCall {
    CachedCall {
        call,
        config: Arc::new(config),
    }
}

/// A call function decorated with a cache.
#[derive(Clone)]
pub struct CachedCall {
    call: CallFn,
    config: Arc<CacheConfig>,
}

impl CachedCall {
    /// Cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Calls through the cache.
    ///
    /// Every error, including store failures, surfaces from the returned
    /// request.
    pub fn call(
        &self,
        params: Params,
        init: RequestInit,
        options: CacheOptions,
    ) -> CancellableRequest<Response> {
        let key = self.config.key.resolve(&params, &init);
        let config = Arc::clone(&self.config);
        let call = Arc::clone(&self.call);

        CancellableRequest::new(async move {
            let store = &config.store;
            let previous = store.get(&key).await?;

            if let Some(entry) = previous.as_ref().filter(|_| !options.force) {
                let retention = options
                    .retention
                    .or(config.retention)
                    .or_else(|| store.retention());
                let now = Utc::now();

                if retention.is_none_or(|retention| entry.is_fresh(retention, now)) {
                    let mut refreshed = entry.clone();
                    refreshed.accessed_at = Some(now);
                    store.set(&key, refreshed.clone()).await?;
                    debug!(key = %key, store = store.name(), "Cache hit");

                    let mut value = refreshed.value.clone();
                    value.cache = Some(CacheMetadata {
                        previous: Some(entry.stamp()),
                        current: Some(refreshed.stamp()),
                        is_cache: true,
                    });
                    return Ok(value);
                }
                debug!(key = %key, "Cache entry expired");
            }

            let request = call(params, init);
            // Aborting this call must also abort the wrapped one.
            let guard = request.signal().drop_guard();
            let result = request.await;
            guard.disarm();

            match result {
                Ok(mut response) => {
                    response.cache = None;
                    let entry = CacheEntry::new(response.clone(), Utc::now());
                    let current = entry.stamp();
                    store.set(&key, entry).await?;
                    debug!(key = %key, store = store.name(), "Cache populated");

                    response.cache = Some(CacheMetadata {
                        previous: previous.as_ref().map(CacheEntry::stamp),
                        current: Some(current),
                        is_cache: false,
                    });
                    Ok(response)
                }
                Err(err) => {
                    let evict = options
                        .evict_on_error
                        .or(config.evict_on_error)
                        .or_else(|| store.evict_on_error())
                        .unwrap_or(false);
                    if evict {
                        warn!(key = %key, error = %err, "Call failed, evicting cache entry");
                        store.delete(&key).await?;
                    }
                    Err(err)
                }
            }
        })
    }

    /// Clears the entries matching the eviction key.
    ///
    /// Returns the key that was cleared, or `None` when it resolved blank.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn evict(
        &self,
        params: &Params,
        init: &RequestInit,
    ) -> Result<Option<String>, ClientError> {
        let key = self
            .config
            .eviction_key
            .as_ref()
            .unwrap_or(&self.config.key)
            .resolve(params, init);
        if key.trim().is_empty() {
            return Ok(None);
        }

        let removed = self.config.store.clear(Some(&key)).await?;
        debug!(key = %key, removed, "Evicted cache entries");
        Ok(Some(key))
    }
}

impl fmt::Debug for CachedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCall")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
