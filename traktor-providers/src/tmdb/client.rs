//! TMDB client.

use std::ops::Deref;
use std::sync::Arc;

use traktor_fetch::{BaseClient, ClientContext};

use super::endpoints::tmdb_api;
use super::provider::{TmdbAuth, TmdbConfig, TmdbProvider};
use crate::api_client::ApiClient;
use crate::error::ProviderError;

/// TMDB client bound to [`tmdb_api`].
#[derive(Debug, Clone)]
pub struct TmdbClient {
    inner: BaseClient<TmdbProvider>,
}

impl TmdbClient {
    /// Creates a client without a user session.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or endpoint.
    pub fn new(config: &TmdbConfig, context: &ClientContext) -> Result<Self, ProviderError> {
        Self::with_auth(config, context, TmdbAuth::default())
    }

    /// Creates a client with a stored session.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or endpoint.
    pub fn with_auth(
        config: &TmdbConfig,
        context: &ClientContext,
        auth: TmdbAuth,
    ) -> Result<Self, ProviderError> {
        let provider = TmdbProvider::new(config)?;
        Ok(Self {
            inner: BaseClient::with_auth(provider, &tmdb_api(), context, auth),
        })
    }

    /// Stores a session id obtained from the authentication endpoints.
    pub fn set_session(&self, session_id: impl Into<String>) -> TmdbAuth {
        let session_id = session_id.into();
        self.inner.update_auth(|auth| TmdbAuth {
            session_id: Some(session_id),
            ..auth.clone()
        })
    }

    /// Converts into a dynamic client.
    pub fn into_dyn(self) -> Arc<dyn ApiClient> {
        Arc::new(self.inner)
    }
}

impl Deref for TmdbClient {
    type Target = BaseClient<TmdbProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
