//! Binding endpoint templates to a client.
//!
//! [`bind`] walks a [`Namespace`] and produces a [`BoundNamespace`] of the
//! same shape, where every leaf is a [`BoundEndpoint`] wired to the owning
//! client's [`Dispatcher`]. Templates with caching enabled also get a
//! [`CachedEndpoint`] backed by the client's cache store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use traktor_core::{
    ApiNode, BodyContract, Endpoint, EndpointOptions, HttpMethod, Namespace, Params, RequestInit,
    Response,
};
use url::Url;

use crate::cache::{CacheConfig, CacheOptions, CachedCall, CallFn, endpoint_keys, with_cache};
use crate::client::Dispatcher;
use crate::error::ClientError;
use crate::request::CancellableRequest;

// ============================================================================
// Metadata
// ============================================================================

/// Template metadata exposed by bound endpoints.
pub trait EndpointMetadata {
    /// The underlying template.
    fn template(&self) -> &Endpoint;

    /// HTTP method.
    fn method(&self) -> HttpMethod {
        self.template().method()
    }

    /// URL pattern.
    fn url(&self) -> &str {
        self.template().url()
    }

    /// Endpoint options.
    fn opts(&self) -> &EndpointOptions {
        self.template().opts()
    }

    /// Body contract.
    fn body(&self) -> Option<&BodyContract> {
        self.template().body()
    }

    /// Template-level request overrides.
    fn init(&self) -> Option<&RequestInit> {
        self.template().init()
    }

    /// Returns true if the template has a validation hook.
    fn has_validate(&self) -> bool {
        self.template().validate().is_some()
    }

    /// Returns true if the template has a transform hook.
    fn has_transform(&self) -> bool {
        self.template().transform().is_some()
    }
}

// ============================================================================
// Bound Endpoint
// ============================================================================

/// An endpoint template wired to a client.
#[derive(Clone)]
pub struct BoundEndpoint {
    template: Arc<Endpoint>,
    dispatcher: Arc<dyn Dispatcher>,
    cached: Option<CachedEndpoint>,
}

impl BoundEndpoint {
    /// Binds a single template.
    pub fn new(template: Endpoint, dispatcher: &Arc<dyn Dispatcher>) -> Self {
        let template = Arc::new(template);
        let cached = template
            .opts()
            .cache
            .is_enabled()
            .then(|| CachedEndpoint::new(Arc::clone(&template), dispatcher));

        Self {
            template,
            dispatcher: Arc::clone(dispatcher),
            cached,
        }
    }

    /// Calls the endpoint.
    ///
    /// # Errors
    ///
    /// Configuration and authentication errors are returned before any
    /// request is made.
    pub fn call(
        &self,
        params: Params,
        init: RequestInit,
    ) -> Result<CancellableRequest<Response>, ClientError> {
        self.dispatcher.dispatch(&self.template, params, init)
    }

    /// Resolves the URL a call with `params` would use.
    ///
    /// # Errors
    ///
    /// Same configuration errors as [`BoundEndpoint::call`].
    pub fn resolve(&self, params: Params) -> Result<Url, ClientError> {
        self.dispatcher.resolve(&self.template, params)
    }

    /// The cached variant, present iff the template enables caching.
    pub fn cached(&self) -> Option<&CachedEndpoint> {
        self.cached.as_ref()
    }
}

impl EndpointMetadata for BoundEndpoint {
    fn template(&self) -> &Endpoint {
        &self.template
    }
}

impl fmt::Debug for BoundEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEndpoint")
            .field("template", &self.template)
            .field("cached", &self.cached.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Cached Endpoint
// ============================================================================

/// The cached variant of a bound endpoint.
#[derive(Clone)]
pub struct CachedEndpoint {
    template: Arc<Endpoint>,
    dispatcher: Arc<dyn Dispatcher>,
    inner: CachedCall,
}

impl CachedEndpoint {
    fn new(template: Arc<Endpoint>, dispatcher: &Arc<dyn Dispatcher>) -> Self {
        let call_dispatcher = Arc::clone(dispatcher);
        let call_template = Arc::clone(&template);
        let call: CallFn = Arc::new(move |params, init| {
            call_dispatcher
                .dispatch(&call_template, params, init)
                .unwrap_or_else(|err| CancellableRequest::ready(Err(err)))
        });

        let (key, eviction_key) = endpoint_keys(&dispatcher.cache_namespace(), &template);
        let policy = template.opts().cache;
        let config = CacheConfig::new(key, dispatcher.cache_store())
            .with_eviction_key(eviction_key)
            .with_retention(policy.retention())
            .with_evict_on_error(policy.evict_on_error());

        Self {
            template,
            dispatcher: Arc::clone(dispatcher),
            inner: with_cache(call, config),
        }
    }

    /// Calls the endpoint through the cache. All errors surface from the
    /// returned request.
    pub fn call(
        &self,
        params: Params,
        init: RequestInit,
        options: CacheOptions,
    ) -> CancellableRequest<Response> {
        self.inner.call(params, init, options)
    }

    /// Evicts every cached variant of this endpoint. Returns the cleared key.
    ///
    /// # Errors
    ///
    /// Returns the cache store's error.
    pub async fn evict(
        &self,
        params: &Params,
        init: &RequestInit,
    ) -> Result<Option<String>, ClientError> {
        self.inner.evict(params, init).await
    }

    /// Resolves the URL a call with `params` would use.
    ///
    /// # Errors
    ///
    /// Same configuration errors as [`BoundEndpoint::call`].
    pub fn resolve(&self, params: Params) -> Result<Url, ClientError> {
        self.dispatcher.resolve(&self.template, params)
    }

    /// Cache configuration of this endpoint.
    pub fn config(&self) -> &CacheConfig {
        self.inner.config()
    }
}

impl EndpointMetadata for CachedEndpoint {
    fn template(&self) -> &Endpoint {
        &self.template
    }
}

impl fmt::Debug for CachedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedEndpoint")
            .field("template", &self.template)
            .field("cache", self.inner.config())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bound Namespace
// ============================================================================

/// A node of a bound tree.
#[derive(Debug, Clone)]
pub enum BoundNode {
    /// A callable endpoint.
    Endpoint(BoundEndpoint),
    /// A nested group.
    Namespace(BoundNamespace),
}

/// A bound tree mirroring the [`Namespace`] it was built from.
#[derive(Debug, Clone, Default)]
pub struct BoundNamespace {
    entries: BTreeMap<String, BoundNode>,
}

impl BoundNamespace {
    /// Returns a direct child.
    pub fn get(&self, name: &str) -> Option<&BoundNode> {
        self.entries.get(name)
    }

    /// Returns a node by dotted path, e.g. `movies.summary`.
    pub fn lookup(&self, path: &str) -> Option<&BoundNode> {
        let mut parts = path.split('.');
        let mut node = self.entries.get(parts.next()?)?;
        for part in parts {
            match node {
                BoundNode::Namespace(ns) => node = ns.entries.get(part)?,
                BoundNode::Endpoint(_) => return None,
            }
        }
        Some(node)
    }

    /// Returns an endpoint by dotted path.
    pub fn endpoint(&self, path: &str) -> Option<&BoundEndpoint> {
        match self.lookup(path)? {
            BoundNode::Endpoint(endpoint) => Some(endpoint),
            BoundNode::Namespace(_) => None,
        }
    }

    /// Returns a nested namespace by dotted path.
    pub fn namespace(&self, path: &str) -> Option<&BoundNamespace> {
        match self.lookup(path)? {
            BoundNode::Namespace(ns) => Some(ns),
            BoundNode::Endpoint(_) => None,
        }
    }

    /// Iterates over direct children in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All endpoints with their dotted paths, in sorted order.
    pub fn leaves(&self) -> Vec<(String, &BoundEndpoint)> {
        let mut out = Vec::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a BoundEndpoint)>) {
        for (name, node) in &self.entries {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match node {
                BoundNode::Endpoint(endpoint) => out.push((path, endpoint)),
                BoundNode::Namespace(ns) => ns.collect_leaves(&path, out),
            }
        }
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binds every template of `namespace` to `dispatcher`, keeping the shape.
pub fn bind(namespace: &Namespace, dispatcher: &Arc<dyn Dispatcher>) -> BoundNamespace {
    let entries = namespace
        .iter()
        .map(|(name, node)| {
            let bound = match node {
                ApiNode::Endpoint(template) => {
                    BoundNode::Endpoint(BoundEndpoint::new(template.clone(), dispatcher))
                }
                ApiNode::Namespace(nested) => BoundNode::Namespace(bind(nested, dispatcher)),
            };
            (name.to_string(), bound)
        })
        .collect();

    BoundNamespace { entries }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use traktor_core::{CacheEntry, CacheError, CacheStore};

    struct NullStore;

    #[async_trait]
    impl CacheStore for NullStore {
        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _entry: CacheEntry) -> Result<(), CacheError> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Ok(false)
        }

        async fn clear(&self, _pattern: Option<&str>) -> Result<usize, CacheError> {
            Ok(0)
        }
    }

    struct EchoDispatcher;

    impl Dispatcher for EchoDispatcher {
        fn dispatch(
            &self,
            template: &Endpoint,
            _params: Params,
            _init: RequestInit,
        ) -> Result<CancellableRequest<Response>, ClientError> {
            Ok(CancellableRequest::ready(Ok(Response::new(template.url(), 200))))
        }

        fn resolve(&self, template: &Endpoint, _params: Params) -> Result<Url, ClientError> {
            Ok(Url::parse("https://example.com")?.join(template.path_pattern())?)
        }

        fn cache_store(&self) -> Arc<dyn CacheStore> {
            Arc::new(NullStore)
        }

        fn cache_namespace(&self) -> String {
            "echo@https://example.com/|".to_string()
        }
    }

    fn api() -> Namespace {
        Namespace::new()
            .endpoint("ping", Endpoint::get("/ping"))
            .namespace(
                "movies",
                Namespace::new()
                    .endpoint("summary", Endpoint::get("/movies/:id").cached())
                    .namespace(
                        "lists",
                        Namespace::new().endpoint("popular", Endpoint::get("/movies/popular")),
                    ),
            )
    }

    #[test]
    fn test_tree_shape_preserved() {
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(EchoDispatcher);
        let bound = bind(&api(), &dispatcher);

        let paths: Vec<_> = bound.leaves().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["movies.lists.popular", "movies.summary", "ping"]);

        let summary = bound.endpoint("movies.summary").unwrap();
        assert_eq!(summary.method(), HttpMethod::Get);
        assert_eq!(summary.url(), "/movies/:id");
        assert!(summary.cached().is_some());
        assert_eq!(summary.cached().unwrap().url(), "/movies/:id");

        assert!(bound.endpoint("ping").unwrap().cached().is_none());
        assert!(bound.namespace("movies.lists").is_some());
        assert!(bound.endpoint("movies").is_none());
        assert!(bound.lookup("ping.nothing").is_none());
    }

    #[tokio::test]
    async fn test_bound_call_forwards_template() {
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(EchoDispatcher);
        let bound = bind(&api(), &dispatcher);

        let response = bound
            .endpoint("movies.lists.popular")
            .unwrap()
            .call(Params::new(), RequestInit::new())
            .unwrap()
            .await
            .unwrap();
        assert_eq!(response.url, "/movies/popular");

        let url = bound
            .endpoint("movies.summary")
            .unwrap()
            .cached()
            .unwrap()
            .resolve(Params::new())
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/movies/:id");
    }
}
