// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Traktor` Store
//!
//! Cache stores and persisted settings for the `Traktor` client framework.
//!
//! This crate provides:
//!
//! - **MemoryCacheStore**: In-process cache store
//! - **JsonFileCacheStore**: Cache store persisted to a JSON file
//! - **SettingsStore**: Credentials and preferences with persistence
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use traktor_store::{MemoryCacheStore, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await?;
//! let cache = settings.get().await.cache.build_store();
//!
//! settings.update(|s| s.trakt.vip = true).await;
//! settings.save().await?;
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod persistence;
pub mod settings_store;

pub use error::StoreError;
pub use file::JsonFileCacheStore;
pub use memory::MemoryCacheStore;
pub use persistence::{
    default_cache_dir, default_cache_path, default_config_dir, default_settings_path, load_json,
    save_json,
};
pub use settings_store::{
    CacheBackend, CacheSettings, LogLevel, Settings, SettingsStore, TmdbSettings, TraktSettings,
    TvdbSettings,
};
