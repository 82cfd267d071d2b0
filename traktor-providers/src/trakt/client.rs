//! Trakt client.

use std::ops::Deref;
use std::sync::Arc;

use traktor_fetch::{BaseClient, ClientContext};

use super::endpoints::trakt_api;
use super::provider::{TraktAuth, TraktConfig, TraktProvider};
use crate::api_client::ApiClient;
use crate::error::ProviderError;

/// Trakt client bound to [`trakt_api`].
#[derive(Debug, Clone)]
pub struct TraktClient {
    inner: BaseClient<TraktProvider>,
}

impl TraktClient {
    /// Creates a client without user authentication.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or endpoint.
    pub fn new(config: &TraktConfig, context: &ClientContext) -> Result<Self, ProviderError> {
        Self::with_auth(config, context, TraktAuth::default())
    }

    /// Creates a client with stored authentication.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or endpoint.
    pub fn with_auth(
        config: &TraktConfig,
        context: &ClientContext,
        auth: TraktAuth,
    ) -> Result<Self, ProviderError> {
        let provider = TraktProvider::new(config)?;
        Ok(Self {
            inner: BaseClient::with_auth(provider, &trakt_api(), context, auth),
        })
    }

    /// Converts into a dynamic client.
    pub fn into_dyn(self) -> Arc<dyn ApiClient> {
        Arc::new(self.inner)
    }
}

impl Deref for TraktClient {
    type Target = BaseClient<TraktProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
