//! Credentials and preferences store.
//!
//! Manages provider credentials, cache configuration and logging preferences
//! with persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use traktor_core::CacheStore;

use crate::error::StoreError;
use crate::file::JsonFileCacheStore;
use crate::memory::MemoryCacheStore;
use crate::persistence::{default_cache_path, default_settings_path, load_json, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Trakt credentials.
    pub trakt: TraktSettings,
    /// TMDB credentials.
    pub tmdb: TmdbSettings,
    /// TVDB credentials.
    pub tvdb: TvdbSettings,
    /// Response cache configuration.
    pub cache: CacheSettings,
    /// Default log level of front ends.
    pub log_level: LogLevel,
}

/// Trakt credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraktSettings {
    /// OAuth application client id, sent as `trakt-api-key`.
    pub client_id: Option<String>,
    /// OAuth application client secret.
    pub client_secret: Option<String>,
    /// API base URL override.
    pub endpoint: Option<String>,
    /// Stored user access token.
    pub access_token: Option<String>,
    /// Whether the user has a VIP account.
    pub vip: bool,
}

/// TMDB credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbSettings {
    /// API read access token.
    pub read_token: Option<String>,
    /// API base URL override.
    pub endpoint: Option<String>,
    /// Stored user session id.
    pub session_id: Option<String>,
}

/// TVDB credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvdbSettings {
    /// Project API key.
    pub api_key: Option<String>,
    /// Subscriber PIN.
    pub pin: Option<String>,
    /// API base URL override.
    pub endpoint: Option<String>,
    /// Stored bearer token from the last login.
    pub token: Option<String>,
}

/// Which cache store backs cached endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// In-process memory; lost on exit.
    #[default]
    Memory,
    /// JSON file on disk.
    File,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::File => write!(f, "file"),
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Backing store.
    pub backend: CacheBackend,
    /// Cache file for the file backend; defaults to the platform cache dir.
    pub path: Option<PathBuf>,
    /// Store-level default retention in seconds.
    pub retention_secs: Option<u64>,
    /// Store-level default evict-on-error flag.
    pub evict_on_error: Option<bool>,
}

impl CacheSettings {
    /// Store-level default retention.
    pub fn retention(&self) -> Option<Duration> {
        self.retention_secs.map(Duration::from_secs)
    }

    /// Cache file used by the file backend.
    pub fn file_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_cache_path)
    }

    /// Builds the configured cache store.
    pub fn build_store(&self) -> Arc<dyn CacheStore> {
        match self.backend {
            CacheBackend::Memory => {
                let mut store = MemoryCacheStore::new();
                if let Some(retention) = self.retention() {
                    store = store.with_retention(retention);
                }
                if let Some(evict) = self.evict_on_error {
                    store = store.with_evict_on_error(evict);
                }
                Arc::new(store)
            }
            CacheBackend::File => {
                let mut store = JsonFileCacheStore::new(self.file_path());
                if let Some(retention) = self.retention() {
                    store = store.with_retention(retention);
                }
                if let Some(evict) = self.evict_on_error {
                    store = store.with_evict_on_error(evict);
                }
                Arc::new(store)
            }
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl LogLevel {
    /// Directive for a `tracing` env filter.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_directive())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// See [`SettingsStore::load`].
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSettings`] if the file does not parse,
    /// so a later save cannot overwrite stored credentials with defaults,
    /// or an IO error if it cannot be read.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = match load_json(&path).await {
            Ok(settings) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Settings file not found, using defaults");
                Settings::default()
            }
            Err(StoreError::Serialization(source)) => {
                return Err(StoreError::InvalidSettings { path, source });
            }
            Err(e) => return Err(e),
        };

        Ok(Self::with_settings(path, settings))
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory; call [`SettingsStore::save`] to persist.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Stores the TVDB bearer token.
    pub async fn set_tvdb_token(&self, token: Option<String>) {
        self.update(|s| s.tvdb.token = token).await;
    }

    /// Gets the cache configuration.
    pub async fn cache(&self) -> CacheSettings {
        self.settings.read().await.cache.clone()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
