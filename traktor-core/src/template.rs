//! Declarative endpoint templates.
//!
//! An [`Endpoint`] describes one API operation: its HTTP method, a URL pattern
//! with `:name` path placeholders and `?key=` query placeholders, the
//! contract for those parameters, an optional body contract, a caching
//! policy, and optional `transform`/`validate` hooks over the parameter bag.
//!
//! Templates are built once with [`EndpointBuilder`] and never change.
//!
//! ```
//! use std::time::Duration;
//! use traktor_core::{AuthRequirement, Endpoint};
//!
//! let summary = Endpoint::get("/movies/:id?extended=")
//!     .required_path("id")
//!     .optional_query("extended")
//!     .retention(Duration::from_secs(3600))
//!     .auth(AuthRequirement::Optional)
//!     .build();
//!
//! assert_eq!(summary.url(), "/movies/:id?extended=");
//! assert!(summary.opts().cache.is_enabled());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CoreError;
use crate::params::Params;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
}

impl HttpMethod {
    /// Returns the canonical upper-case verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Returns true if requests with this method never carry a body.
    pub fn is_bodyless(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(CoreError::InvalidParams(format!("unknown HTTP method: {other}"))),
        }
    }
}

// ============================================================================
// Parameter Contract
// ============================================================================

/// How a path or query parameter must be supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamRequirement {
    /// Always required.
    Required,
    /// May be omitted.
    Optional,
    /// Required only while the named condition is active (e.g. `"vip"`).
    RequiredWhen(String),
}

impl ParamRequirement {
    /// Returns true if the parameter is required under the active conditions.
    pub fn is_required<S: AsRef<str>>(&self, conditions: &[S]) -> bool {
        match self {
            Self::Required => true,
            Self::Optional => false,
            Self::RequiredWhen(condition) => conditions.iter().any(|c| c.as_ref() == condition),
        }
    }
}

/// Requirements for the path and query placeholders of a URL pattern.
///
/// Placeholders not listed here are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterContract {
    /// Path placeholder requirements, keyed by placeholder name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path: BTreeMap<String, ParamRequirement>,
    /// Query key requirements, keyed by query key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, ParamRequirement>,
}

impl ParameterContract {
    /// Requirement of a path placeholder.
    pub fn path_requirement(&self, name: &str) -> &ParamRequirement {
        self.path.get(name).unwrap_or(&ParamRequirement::Optional)
    }

    /// Requirement of a query key.
    pub fn query_requirement(&self, name: &str) -> &ParamRequirement {
        self.query.get(name).unwrap_or(&ParamRequirement::Optional)
    }
}

// ============================================================================
// Body Contract
// ============================================================================

/// Body fields accepted by an endpoint, each flagged required or optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyContract(BTreeMap<String, bool>);

impl BodyContract {
    /// Creates an empty contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, required: bool) -> Self {
        self.0.insert(name.into(), required);
        self
    }

    /// Returns `Some(required)` if the field is part of the contract.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    /// Returns true if the field is part of the contract.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over `(field, required)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterates over the names of required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, r)| **r).map(|(k, _)| k.as_str())
    }

    /// Returns true if the contract has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for BodyContract {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ============================================================================
// Cache Policy
// ============================================================================

/// Caching policy of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// No cached variant.
    #[default]
    Disabled,
    /// Cached, retention taken from the call or the cache store.
    Enabled,
    /// Cached with a template-level retention window.
    Retention(Duration),
    /// Cached with explicit retention and evict-on-error settings.
    Detailed {
        /// Template-level retention window.
        retention: Option<Duration>,
        /// Whether a failed refresh deletes the cached entry.
        evict_on_error: Option<bool>,
    },
}

impl CachePolicy {
    /// Returns true if the endpoint gets a cached variant.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Template-level retention, if any.
    pub fn retention(&self) -> Option<Duration> {
        match self {
            Self::Retention(retention) => Some(*retention),
            Self::Detailed { retention, .. } => *retention,
            Self::Disabled | Self::Enabled => None,
        }
    }

    /// Template-level evict-on-error flag, if any.
    pub fn evict_on_error(&self) -> Option<bool> {
        match self {
            Self::Detailed { evict_on_error, .. } => *evict_on_error,
            _ => None,
        }
    }
}

// ============================================================================
// Endpoint Options
// ============================================================================

/// Whether an endpoint needs the user's credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRequirement {
    /// Credentials are never sent.
    #[default]
    None,
    /// Credentials are sent when available.
    Optional,
    /// Credentials must be present.
    Required,
}

/// Options attached to an endpoint template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointOptions {
    /// Caching policy.
    #[serde(default)]
    pub cache: CachePolicy,
    /// Path and query parameter contract.
    #[serde(default)]
    pub parameters: ParameterContract,
    /// Authentication requirement.
    #[serde(default)]
    pub auth: AuthRequirement,
    /// Whether the endpoint returns paginated results.
    #[serde(default)]
    pub pagination: bool,
    /// Provider-specific flags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Value>,
}

// ============================================================================
// Request Init
// ============================================================================

/// Request overrides applied on top of what the provider computes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInit {
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestInit {
    /// Creates empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, builder style.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns true if there is nothing to override.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Merges `other` on top of `self`; `other` wins on conflicts.
    #[must_use]
    pub fn merged(&self, other: &RequestInit) -> RequestInit {
        let mut headers = self.headers.clone();
        headers.extend(other.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        RequestInit { headers }
    }
}

// ============================================================================
// Hooks
// ============================================================================

/// Parameter validation hook. Returning `false` rejects the call.
#[derive(Clone)]
pub struct ValidateFn(Arc<dyn Fn(&Params) -> bool + Send + Sync>);

impl ValidateFn {
    /// Wraps a validation closure.
    pub fn new(f: impl Fn(&Params) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the hook.
    pub fn check(&self, params: &Params) -> bool {
        (self.0)(params)
    }
}

impl fmt::Debug for ValidateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidateFn(..)")
    }
}

/// Parameter transform hook, run before validation.
#[derive(Clone)]
pub struct TransformFn(Arc<dyn Fn(Params) -> Params + Send + Sync>);

impl TransformFn {
    /// Wraps a transform closure.
    pub fn new(f: impl Fn(Params) -> Params + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the hook.
    pub fn apply(&self, params: Params) -> Params {
        (self.0)(params)
    }
}

impl fmt::Debug for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformFn(..)")
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// Immutable descriptor of one API operation.
///
/// The serialized form (hooks excluded) is what cache keys are derived from.
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    method: HttpMethod,
    url: String,
    opts: EndpointOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<BodyContract>,
    #[serde(skip_serializing_if = "Option::is_none")]
    init: Option<RequestInit>,
    #[serde(skip)]
    validate: Option<ValidateFn>,
    #[serde(skip)]
    transform: Option<TransformFn>,
}

impl Endpoint {
    /// Starts building an endpoint.
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder::new(method, url)
    }

    /// Starts building a GET endpoint.
    pub fn get(url: impl Into<String>) -> EndpointBuilder {
        Self::builder(HttpMethod::Get, url)
    }

    /// Starts building a POST endpoint.
    pub fn post(url: impl Into<String>) -> EndpointBuilder {
        Self::builder(HttpMethod::Post, url)
    }

    /// Starts building a PUT endpoint.
    pub fn put(url: impl Into<String>) -> EndpointBuilder {
        Self::builder(HttpMethod::Put, url)
    }

    /// Starts building a DELETE endpoint.
    pub fn delete(url: impl Into<String>) -> EndpointBuilder {
        Self::builder(HttpMethod::Delete, url)
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// URL pattern.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Endpoint options.
    pub fn opts(&self) -> &EndpointOptions {
        &self.opts
    }

    /// Body contract, if the endpoint takes a body.
    pub fn body(&self) -> Option<&BodyContract> {
        self.body.as_ref()
    }

    /// Template-level request overrides.
    pub fn init(&self) -> Option<&RequestInit> {
        self.init.as_ref()
    }

    /// Validation hook.
    pub fn validate(&self) -> Option<&ValidateFn> {
        self.validate.as_ref()
    }

    /// Transform hook.
    pub fn transform(&self) -> Option<&TransformFn> {
        self.transform.as_ref()
    }

    /// Path part of the URL pattern (before the first `?`).
    pub fn path_pattern(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }

    /// Query part of the URL pattern (after the first `?`), if any.
    pub fn query_pattern(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }

    /// Names of the `:name` placeholders in the path pattern.
    pub fn path_placeholders(&self) -> impl Iterator<Item = &str> {
        self.path_pattern()
            .split('/')
            .filter_map(|segment| segment.strip_prefix(':'))
    }

    /// Query keys declared by the URL pattern, with their literal defaults.
    pub fn query_placeholders(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query_pattern()
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    /// Short human-readable form, e.g. `GET /movies/:id`.
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path_pattern())
    }

    /// Checks that the parameter and body contracts agree with the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTemplate`] when the contract names a
    /// placeholder the URL pattern does not contain, or a body contract is
    /// attached to a body-less method.
    pub fn check(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidTemplate {
            url: self.url.clone(),
            reason,
        };

        for name in self.opts.parameters.path.keys() {
            if !self.path_placeholders().any(|p| p == name) {
                return Err(invalid(format!("path parameter '{name}' is not in the pattern")));
            }
        }

        for name in self.opts.parameters.query.keys() {
            if !self.query_placeholders().any(|(k, _)| k == name) {
                return Err(invalid(format!("query parameter '{name}' is not in the pattern")));
            }
        }

        if self.body.is_some() && self.method.is_bodyless() {
            return Err(invalid(format!("{} endpoints cannot take a body", self.method)));
        }

        Ok(())
    }
}

// ============================================================================
// Endpoint Builder
// ============================================================================

/// Builder for [`Endpoint`].
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    endpoint: Endpoint,
}

impl EndpointBuilder {
    /// Creates a builder for the given method and URL pattern.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint {
                method,
                url: url.into(),
                opts: EndpointOptions::default(),
                body: None,
                init: None,
                validate: None,
                transform: None,
            },
        }
    }

    /// Sets the requirement of a path placeholder.
    #[must_use]
    pub fn path(mut self, name: impl Into<String>, requirement: ParamRequirement) -> Self {
        self.endpoint.opts.parameters.path.insert(name.into(), requirement);
        self
    }

    /// Marks a path placeholder as required.
    #[must_use]
    pub fn required_path(self, name: impl Into<String>) -> Self {
        self.path(name, ParamRequirement::Required)
    }

    /// Marks a path placeholder as optional.
    #[must_use]
    pub fn optional_path(self, name: impl Into<String>) -> Self {
        self.path(name, ParamRequirement::Optional)
    }

    /// Sets the requirement of a query key.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, requirement: ParamRequirement) -> Self {
        self.endpoint.opts.parameters.query.insert(name.into(), requirement);
        self
    }

    /// Marks a query key as required.
    #[must_use]
    pub fn required_query(self, name: impl Into<String>) -> Self {
        self.query(name, ParamRequirement::Required)
    }

    /// Marks a query key as optional.
    #[must_use]
    pub fn optional_query(self, name: impl Into<String>) -> Self {
        self.query(name, ParamRequirement::Optional)
    }

    /// Marks a query key as required while `condition` is active.
    #[must_use]
    pub fn query_when(self, name: impl Into<String>, condition: impl Into<String>) -> Self {
        self.query(name, ParamRequirement::RequiredWhen(condition.into()))
    }

    /// Adds a body field.
    #[must_use]
    pub fn body_field(mut self, name: impl Into<String>, required: bool) -> Self {
        let body = self.endpoint.body.take().unwrap_or_default();
        self.endpoint.body = Some(body.field(name, required));
        self
    }

    /// Sets the whole body contract.
    #[must_use]
    pub fn body(mut self, contract: BodyContract) -> Self {
        self.endpoint.body = Some(contract);
        self
    }

    /// Sets the caching policy.
    #[must_use]
    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.endpoint.opts.cache = policy;
        self
    }

    /// Enables caching with the store's default retention.
    #[must_use]
    pub fn cached(self) -> Self {
        self.cache(CachePolicy::Enabled)
    }

    /// Enables caching with a template-level retention.
    #[must_use]
    pub fn retention(self, retention: Duration) -> Self {
        self.cache(CachePolicy::Retention(retention))
    }

    /// Sets the authentication requirement.
    #[must_use]
    pub fn auth(mut self, auth: AuthRequirement) -> Self {
        self.endpoint.opts.auth = auth;
        self
    }

    /// Marks the endpoint as paginated.
    #[must_use]
    pub fn paginated(mut self) -> Self {
        self.endpoint.opts.pagination = true;
        self
    }

    /// Adds a provider-specific flag.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.endpoint.opts.extras.insert(key.into(), value.into());
        self
    }

    /// Adds a template-level request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let init = self.endpoint.init.take().unwrap_or_default();
        self.endpoint.init = Some(init.header(name, value));
        self
    }

    /// Sets the validation hook.
    #[must_use]
    pub fn validate(mut self, f: impl Fn(&Params) -> bool + Send + Sync + 'static) -> Self {
        self.endpoint.validate = Some(ValidateFn::new(f));
        self
    }

    /// Sets the transform hook.
    #[must_use]
    pub fn transform(mut self, f: impl Fn(Params) -> Params + Send + Sync + 'static) -> Self {
        self.endpoint.transform = Some(TransformFn::new(f));
        self
    }

    /// Finishes the template.
    pub fn build(self) -> Endpoint {
        self.endpoint
    }
}

impl From<EndpointBuilder> for Endpoint {
    fn from(builder: EndpointBuilder) -> Self {
        builder.build()
    }
}

// ============================================================================
// Tests
// ============================================================================
