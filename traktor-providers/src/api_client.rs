//! Object-safe client surface shared by every provider.
//!
//! [`ApiClient`] lets callers that only know a provider at runtime (the CLI,
//! for instance) list, resolve and call endpoints by dotted path.

use async_trait::async_trait;
use traktor_core::{Params, ProviderKind, RequestInit, Response};
use traktor_fetch::{BaseClient, BoundEndpoint, BoundNamespace, CacheOptions, Provider};
use url::Url;

use crate::error::ProviderError;

/// A [`Provider`] with a known [`ProviderKind`].
pub trait KnownProvider: Provider {
    /// The provider's kind.
    const KIND: ProviderKind;
}

/// Dynamic access to a provider client.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Provider of this client.
    fn kind(&self) -> ProviderKind;

    /// Bound endpoint tree.
    fn api(&self) -> &BoundNamespace;

    /// Looks up an endpoint by dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownEndpoint`] if nothing is bound there.
    fn endpoint(&self, path: &str) -> Result<&BoundEndpoint, ProviderError> {
        self.api()
            .endpoint(path)
            .ok_or_else(|| ProviderError::UnknownEndpoint(path.to_string()))
    }

    /// Resolves the URL a call would use.
    ///
    /// # Errors
    ///
    /// Returns lookup and parameter errors.
    fn resolve(&self, path: &str, params: Params) -> Result<Url, ProviderError> {
        Ok(self.endpoint(path)?.resolve(params)?)
    }

    /// Calls an endpoint, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns lookup, parameter, transport and response errors.
    async fn call(
        &self,
        path: &str,
        params: Params,
        init: RequestInit,
    ) -> Result<Response, ProviderError> {
        let request = self.endpoint(path)?.call(params, init)?;
        Ok(request.await?)
    }

    /// Calls the cached variant of an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotCacheable`] for endpoints without a cache
    /// policy, otherwise the same errors as [`ApiClient::call`].
    async fn call_cached(
        &self,
        path: &str,
        params: Params,
        init: RequestInit,
        options: CacheOptions,
    ) -> Result<Response, ProviderError> {
        let cached = self
            .endpoint(path)?
            .cached()
            .ok_or_else(|| ProviderError::NotCacheable(path.to_string()))?;
        Ok(cached.call(params, init, options).await?)
    }

    /// Evicts every cached variant of an endpoint. Returns the cleared key.
    ///
    /// # Errors
    ///
    /// Returns lookup and cache store errors.
    async fn evict(&self, path: &str) -> Result<Option<String>, ProviderError> {
        let cached = self
            .endpoint(path)?
            .cached()
            .ok_or_else(|| ProviderError::NotCacheable(path.to_string()))?;
        Ok(cached.evict(&Params::new(), &RequestInit::new()).await?)
    }

    /// Clears cached responses; see [`BaseClient::clear_cache`].
    ///
    /// # Errors
    ///
    /// Returns the cache store's error.
    async fn clear_cache(&self, key: Option<&str>, exact: bool) -> Result<usize, ProviderError>;
}

#[async_trait]
impl<P: KnownProvider> ApiClient for BaseClient<P> {
    fn kind(&self) -> ProviderKind {
        P::KIND
    }

    fn api(&self) -> &BoundNamespace {
        BaseClient::api(self)
    }

    async fn clear_cache(&self, key: Option<&str>, exact: bool) -> Result<usize, ProviderError> {
        Ok(BaseClient::clear_cache(self, key, exact).await?)
    }
}
