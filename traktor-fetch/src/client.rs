//! Base client shared by every provider.
//!
//! A [`BaseClient`] owns a provider's authentication state, the observers of
//! that state and of outgoing calls, and the bound endpoint tree. Provider
//! specifics (URL, headers, body, response handling) come from the
//! [`Provider`] hooks.
//!
//! # Call path
//!
//! 1. `transform` hook, then `validate` hook
//! 2. [`Provider::parse_url`] and [`Provider::parse_headers`], then template
//!    and call headers on top
//! 3. [`Provider::parse_body`] when the method carries a body and the
//!    template has a body contract
//! 4. Call listeners are notified with the request and its pending result
//! 5. Transport, then [`Provider::parse_response`]
//!
//! Steps 1 to 4 are synchronous: configuration and authentication errors are
//! returned before any request exists.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use traktor_core::{BodyContract, CacheStore, Endpoint, Namespace, Params, RequestInit, Response};
use url::Url;

use crate::binder::{BoundEndpoint, BoundNamespace, bind};
use crate::cache::cache_namespace;
use crate::context::ClientContext;
use crate::error::ClientError;
use crate::observable::{Observable, ObserverId};
use crate::request::CancellableRequest;
use crate::resolver::{resolve_body, resolve_url};
use crate::transport::{HttpRequest, Transport};

// ============================================================================
// Provider Hooks
// ============================================================================

/// Provider-specific request and response handling.
pub trait Provider: Send + Sync + 'static {
    /// Authentication record (tokens, expiry, session identifiers).
    type Auth: Clone + Default + fmt::Debug + Send + Sync + 'static;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Base URL every endpoint path is resolved against.
    fn endpoint(&self) -> &Url;

    /// Conditions activating conditional parameter requirements.
    fn conditions(&self, _auth: &Self::Auth) -> Vec<String> {
        Vec::new()
    }

    /// Resolves the request URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for missing parameters.
    fn parse_url(
        &self,
        template: &Endpoint,
        params: &Params,
        auth: &Self::Auth,
    ) -> Result<Url, ClientError> {
        resolve_url(template, params, self.endpoint(), &self.conditions(auth))
    }

    /// Computes the provider headers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationRequired`] when the template
    /// needs credentials that `auth` does not hold.
    fn parse_headers(
        &self,
        template: &Endpoint,
        auth: &Self::Auth,
    ) -> Result<HeaderMap, ClientError>;

    /// Builds the request body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingBodyParameter`] for missing fields.
    fn parse_body(
        &self,
        _template: &Endpoint,
        contract: &BodyContract,
        params: &Params,
    ) -> Result<String, ClientError> {
        resolve_body(contract, params)
    }

    /// Post-processes a response.
    ///
    /// # Errors
    ///
    /// The default fails with [`ClientError::Response`] on non-2xx statuses.
    fn parse_response(
        &self,
        _template: &Endpoint,
        response: Response,
    ) -> Result<Response, ClientError> {
        if response.ok() {
            Ok(response)
        } else {
            Err(ClientError::Response(Box::new(response)))
        }
    }
}

// ============================================================================
// Observed Values
// ============================================================================

/// An authentication transition.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange<A> {
    /// State before the update.
    pub previous: A,
    /// State after the update.
    pub current: A,
}

/// Pending or finished result of a call, shareable between observers.
pub type CallQuery = Shared<BoxFuture<'static, Result<Response, ClientError>>>;

/// One outgoing call, published when it is dispatched.
#[derive(Clone)]
pub struct CallRecord {
    /// The request as sent.
    pub request: HttpRequest,
    /// The call's result; awaiting it also drives the request.
    pub query: CallQuery,
    /// Dispatch time.
    pub started_at: DateTime<Utc>,
}

impl fmt::Debug for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRecord")
            .field("request", &self.request)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// The call surface bound endpoints forward to.
pub trait Dispatcher: Send + Sync {
    /// Dispatches a call.
    ///
    /// # Errors
    ///
    /// Configuration and authentication errors are returned synchronously;
    /// everything else surfaces from the returned request.
    fn dispatch(
        &self,
        template: &Endpoint,
        params: Params,
        init: RequestInit,
    ) -> Result<CancellableRequest<Response>, ClientError>;

    /// Resolves the URL a call would use, without calling.
    ///
    /// # Errors
    ///
    /// Same configuration errors as [`Dispatcher::dispatch`].
    fn resolve(&self, template: &Endpoint, params: Params) -> Result<Url, ClientError>;

    /// Cache store used by cached endpoints.
    fn cache_store(&self) -> Arc<dyn CacheStore>;

    /// Prefix of every cache key this dispatcher writes.
    fn cache_namespace(&self) -> String;
}

/// Runs a template's `transform` then `validate` hooks.
///
/// # Errors
///
/// Returns [`ClientError::ValidationFailed`] if `validate` rejects the
/// transformed parameters.
pub fn prepare_params(template: &Endpoint, params: Params) -> Result<Params, ClientError> {
    let params = match template.transform() {
        Some(transform) => transform.apply(params),
        None => params,
    };

    match template.validate() {
        Some(validate) if !validate.check(&params) => {
            Err(ClientError::ValidationFailed(template.signature()))
        }
        _ => Ok(params),
    }
}

/// Adds request-init headers on top of `headers`.
///
/// # Errors
///
/// Returns [`ClientError::InvalidHeader`] for names or values that are not
/// valid HTTP.
pub fn apply_init(headers: &mut HeaderMap, init: &RequestInit) -> Result<(), ClientError> {
    for (name, value) in &init.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::InvalidHeader(format!("{name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(())
}

/// Builds a header value from text.
///
/// # Errors
///
/// Returns [`ClientError::InvalidHeader`] if the value is not valid HTTP.
pub fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader(e.to_string()))
}

// ============================================================================
// Client Core
// ============================================================================

/// State shared between a client and its bound endpoints.
pub struct ClientCore<P: Provider> {
    provider: Arc<P>,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    auth: RwLock<P::Auth>,
    auth_observers: Observable<AuthChange<P::Auth>>,
    call_observers: Observable<CallRecord>,
}

impl<P: Provider> ClientCore<P> {
    fn auth(&self) -> P::Auth {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<P: Provider> Dispatcher for ClientCore<P> {
    #[instrument(
        skip_all,
        fields(provider = self.provider.name(), endpoint = %template.signature())
    )]
    fn dispatch(
        &self,
        template: &Endpoint,
        params: Params,
        init: RequestInit,
    ) -> Result<CancellableRequest<Response>, ClientError> {
        let params = prepare_params(template, params)?;
        let auth = self.auth();

        let url = self.provider.parse_url(template, &params, &auth)?;
        let mut headers = self.provider.parse_headers(template, &auth)?;
        let init = match template.init() {
            Some(base) => base.merged(&init),
            None => init,
        };
        apply_init(&mut headers, &init)?;

        let body = match template.body() {
            Some(contract) if !template.method().is_bodyless() => {
                Some(self.provider.parse_body(template, contract, &params)?)
            }
            _ => None,
        };

        let request = HttpRequest {
            method: template.method(),
            url,
            headers,
            body,
        };

        let token = CancellationToken::new();
        let transport = Arc::clone(&self.transport);
        let provider = Arc::clone(&self.provider);
        let owned_template = template.clone();
        let outgoing = request.clone();
        let query: CallQuery = CancellableRequest::with_token(token.clone(), async move {
            let response = transport.send(outgoing).await?;
            provider.parse_response(&owned_template, response)
        })
        .boxed()
        .shared();

        debug!(url = %request.url, "Dispatching call");
        self.call_observers.notify(&CallRecord {
            request,
            query: query.clone(),
            started_at: Utc::now(),
        });

        Ok(CancellableRequest::with_token(token, query))
    }

    fn resolve(&self, template: &Endpoint, params: Params) -> Result<Url, ClientError> {
        let params = prepare_params(template, params)?;
        self.provider.parse_url(template, &params, &self.auth())
    }

    fn cache_store(&self) -> Arc<dyn CacheStore> {
        Arc::clone(&self.cache)
    }

    fn cache_namespace(&self) -> String {
        cache_namespace(self.provider.name(), self.provider.endpoint())
    }
}

// ============================================================================
// Base Client
// ============================================================================

/// A client for one provider: auth state, observers, and bound endpoints.
pub struct BaseClient<P: Provider> {
    core: Arc<ClientCore<P>>,
    api: Arc<BoundNamespace>,
}

impl<P: Provider> BaseClient<P> {
    /// Creates a client with empty authentication.
    pub fn new(provider: P, api: &Namespace, context: &ClientContext) -> Self {
        Self::with_auth(provider, api, context, P::Auth::default())
    }

    /// Creates a client with initial authentication.
    pub fn with_auth(provider: P, api: &Namespace, context: &ClientContext, auth: P::Auth) -> Self {
        let core = Arc::new(ClientCore {
            provider: Arc::new(provider),
            transport: Arc::clone(&context.transport),
            cache: Arc::clone(&context.cache),
            auth: RwLock::new(auth),
            auth_observers: Observable::new(),
            call_observers: Observable::new(),
        });

        let dispatcher: Arc<dyn Dispatcher> = core.clone();
        let api = bind(api, &dispatcher);
        debug!(
            provider = core.provider.name(),
            endpoints = api.leaves().len(),
            "Bound endpoint tree"
        );

        Self {
            core,
            api: Arc::new(api),
        }
    }

    /// The provider hooks.
    pub fn provider(&self) -> &P {
        &self.core.provider
    }

    /// The bound endpoint tree.
    pub fn api(&self) -> &BoundNamespace {
        &self.api
    }

    /// Looks up a bound endpoint by dotted path.
    pub fn endpoint(&self, path: &str) -> Option<&BoundEndpoint> {
        self.api.endpoint(path)
    }

    /// The shared cache store.
    pub fn cache(&self) -> Arc<dyn CacheStore> {
        Arc::clone(&self.core.cache)
    }

    /// Snapshot of the current authentication state.
    pub fn auth(&self) -> P::Auth {
        self.core.auth()
    }

    /// Replaces the authentication state with `f(previous)` and notifies
    /// auth observers. Returns the new state.
    pub fn update_auth(&self, f: impl FnOnce(&P::Auth) -> P::Auth) -> P::Auth {
        let change = {
            let mut auth = self
                .core
                .auth
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let previous = auth.clone();
            let current = f(&previous);
            *auth = current.clone();
            AuthChange { previous, current }
        };

        debug!(provider = self.core.provider.name(), "Authentication updated");
        self.core.auth_observers.notify(&change);
        change.current
    }

    /// Replaces the authentication state.
    pub fn set_auth(&self, auth: P::Auth) -> P::Auth {
        self.update_auth(|_| auth)
    }

    /// Subscribes to authentication changes.
    pub fn on_auth_change(
        &self,
        observer: impl Fn(&AuthChange<P::Auth>) + Send + Sync + 'static,
    ) -> ObserverId {
        self.core.auth_observers.subscribe(observer)
    }

    /// Subscribes to outgoing calls.
    pub fn on_call(&self, observer: impl Fn(&CallRecord) + Send + Sync + 'static) -> ObserverId {
        self.core.call_observers.subscribe(observer)
    }

    /// Unsubscribes one observer from whichever stream holds it, or every
    /// observer from both streams. Returns true if anything was removed.
    pub fn unsubscribe(&self, observer: Option<ObserverId>) -> bool {
        match observer {
            Some(id) => {
                let auth = self.core.auth_observers.unsubscribe(id);
                let call = self.core.call_observers.unsubscribe(id);
                auth || call
            }
            None => self.core.auth_observers.clear() + self.core.call_observers.clear() > 0,
        }
    }

    /// Clears cached responses.
    ///
    /// With `exact`, deletes the single entry `key`; otherwise clears every
    /// entry whose key starts with `key`. Without a key, clears everything.
    /// Returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn clear_cache(&self, key: Option<&str>, exact: bool) -> Result<usize, ClientError> {
        let removed = match key {
            Some(key) if exact => usize::from(self.core.cache.delete(key).await?),
            pattern => self.core.cache.clear(pattern).await?,
        };
        debug!(provider = self.core.provider.name(), removed, "Cache cleared");
        Ok(removed)
    }

    /// Dispatches a call for any template, bound or not.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch(
        &self,
        template: &Endpoint,
        params: Params,
        init: RequestInit,
    ) -> Result<CancellableRequest<Response>, ClientError> {
        self.core.dispatch(template, params, init)
    }

    /// Resolves the URL a call would use.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::resolve`].
    pub fn resolve(&self, template: &Endpoint, params: Params) -> Result<Url, ClientError> {
        self.core.resolve(template, params)
    }
}

impl<P: Provider> Clone for BaseClient<P> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            api: Arc::clone(&self.api),
        }
    }
}

impl<P: Provider> fmt::Debug for BaseClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseClient")
            .field("provider", &self.core.provider.name())
            .field("endpoint", &self.core.provider.endpoint().as_str())
            .field("auth_observers", &self.core.auth_observers.len())
            .field("call_observers", &self.core.call_observers.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
