//! TVDB client.

use std::ops::Deref;
use std::sync::Arc;

use tracing::{debug, instrument};
use traktor_core::{Params, RequestInit};
use traktor_fetch::{BaseClient, ClientContext};

use super::endpoints::tvdb_api;
use super::provider::{TvdbAuth, TvdbConfig, TvdbProvider};
use crate::api_client::ApiClient;
use crate::error::ProviderError;

/// TVDB client bound to [`tvdb_api`].
#[derive(Debug, Clone)]
pub struct TvdbClient {
    inner: BaseClient<TvdbProvider>,
    api_key: String,
    pin: Option<String>,
}

impl TvdbClient {
    /// Creates a client without a token; call [`TvdbClient::login`] first.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or endpoint.
    pub fn new(config: &TvdbConfig, context: &ClientContext) -> Result<Self, ProviderError> {
        Self::with_auth(config, context, TvdbAuth::default())
    }

    /// Creates a client with a stored token.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or endpoint.
    pub fn with_auth(
        config: &TvdbConfig,
        context: &ClientContext,
        auth: TvdbAuth,
    ) -> Result<Self, ProviderError> {
        let provider = TvdbProvider::new(config)?;
        Ok(Self {
            inner: BaseClient::with_auth(provider, &tvdb_api(), context, auth),
            api_key: config.api_key.clone(),
            pin: config.pin.clone(),
        })
    }

    /// Exchanges the API key (and PIN) for a bearer token and stores it.
    ///
    /// # Errors
    ///
    /// Returns the call's error, or [`ProviderError::NoToken`] if the
    /// response does not carry one.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<String, ProviderError> {
        let login = self
            .inner
            .endpoint("login")
            .ok_or_else(|| ProviderError::UnknownEndpoint("login".to_string()))?;

        let mut params = Params::new().with("apikey", self.api_key.as_str());
        if let Some(pin) = &self.pin {
            params = params.with("pin", pin.as_str());
        }

        let response = login.call(params, RequestInit::new())?.await?;
        let token = response
            .json_value()
            .map_err(traktor_fetch::ClientError::from)?
            .get("token")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or(ProviderError::NoToken)?;

        self.inner.set_auth(TvdbAuth {
            token: Some(token.clone()),
        });
        debug!("Logged in to TVDB");
        Ok(token)
    }

    /// Returns true once a token is stored.
    pub fn is_logged_in(&self) -> bool {
        self.inner.auth().token.is_some()
    }

    /// Converts into a dynamic client.
    pub fn into_dyn(self) -> Arc<dyn ApiClient> {
        Arc::new(self.inner)
    }
}

impl Deref for TvdbClient {
    type Target = BaseClient<TvdbProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
