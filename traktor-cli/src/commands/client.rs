//! Builds provider clients from stored settings.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use traktor_core::ProviderKind;
use traktor_fetch::{ClientContext, ClientSettings};
use traktor_providers::{
    ApiClient, TmdbAuth, TmdbClient, TmdbConfig, TraktAuth, TraktClient, TraktConfig, TvdbAuth,
    TvdbClient, TvdbConfig,
};
use traktor_store::{Settings, SettingsStore};

const USER_AGENT: &str = concat!("traktor-cli/", env!("CARGO_PKG_VERSION"));

/// Creates the client context: the configured cache store plus the default
/// transport.
pub fn build_context(settings: &Settings) -> Result<ClientContext> {
    let store = settings.cache.build_store();
    debug!(store = store.name(), "Using cache store");

    let context = ClientContext::builder(store)
        .settings(ClientSettings::default().with_user_agent(USER_AGENT))
        .build()?;
    Ok(context)
}

/// Connects to a provider with the stored credentials.
///
/// A TVDB client without a stored token logs in and saves the new token.
pub async fn connect(kind: ProviderKind, store: &SettingsStore) -> Result<Arc<dyn ApiClient>> {
    let settings = store.get().await;
    let context = build_context(&settings)?;

    match kind {
        ProviderKind::Trakt => {
            let trakt = &settings.trakt;
            let client_id = credential(trakt.client_id.as_deref(), "trakt.client_id")?;
            let mut config = TraktConfig::new(client_id);
            if let Some(endpoint) = &trakt.endpoint {
                config = config.with_endpoint(endpoint.as_str());
            }
            let auth = TraktAuth {
                access_token: trakt.access_token.clone(),
                vip: trakt.vip,
                ..TraktAuth::default()
            };
            Ok(TraktClient::with_auth(&config, &context, auth)?.into_dyn())
        }
        ProviderKind::Tmdb => {
            let tmdb = &settings.tmdb;
            let read_token = credential(tmdb.read_token.as_deref(), "tmdb.read_token")?;
            let mut config = TmdbConfig::new(read_token);
            if let Some(endpoint) = &tmdb.endpoint {
                config = config.with_endpoint(endpoint.as_str());
            }
            let auth = TmdbAuth {
                session_id: tmdb.session_id.clone(),
                account_id: None,
            };
            Ok(TmdbClient::with_auth(&config, &context, auth)?.into_dyn())
        }
        ProviderKind::Tvdb => {
            let tvdb = &settings.tvdb;
            let api_key = credential(tvdb.api_key.as_deref(), "tvdb.api_key")?;
            let mut config = TvdbConfig::new(api_key);
            if let Some(pin) = &tvdb.pin {
                config = config.with_pin(pin.as_str());
            }
            if let Some(endpoint) = &tvdb.endpoint {
                config = config.with_endpoint(endpoint.as_str());
            }
            let auth = TvdbAuth {
                token: tvdb.token.clone(),
            };
            let client = TvdbClient::with_auth(&config, &context, auth)?;

            if !client.is_logged_in() {
                let token = client.login().await.context("TVDB login failed")?;
                store.set_tvdb_token(Some(token)).await;
                store.save().await?;
                info!("Stored new TVDB token");
            }
            Ok(client.into_dyn())
        }
    }
}

fn credential<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!(
            "Missing credential '{key}'. Set it with: traktor config set {key} <value>"
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
