//! Cache store persisted to a JSON file.
//!
//! The file is read on first use and rewritten after every content change,
//! so cached responses survive restarts of short-lived processes like the
//! CLI. Refreshing only an entry's access stamp stays in memory until the
//! next rewrite. With a default retention, expired entries are dropped
//! whenever the file is rewritten.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{RwLock, RwLockMappedWriteGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use traktor_core::{CacheEntry, CacheError, CacheStore};

use crate::persistence::{default_cache_path, load_json, save_json};

type Entries = BTreeMap<String, CacheEntry>;

/// Cache store backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileCacheStore {
    path: PathBuf,
    entries: RwLock<Option<Entries>>,
    retention: Option<Duration>,
    evict_on_error: Option<bool>,
}

impl JsonFileCacheStore {
    /// Creates a store for the given file. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(None),
            retention: None,
            evict_on_error: None,
        }
    }

    /// Creates a store at the default cache path.
    pub fn at_default_path() -> Self {
        Self::new(default_cache_path())
    }

    /// Sets the default retention.
    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Sets the default evict-on-error flag.
    #[must_use]
    pub fn with_evict_on_error(mut self, evict: bool) -> Self {
        self.evict_on_error = Some(evict);
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locks the entries, loading the file on first access.
    ///
    /// An unreadable file is treated as empty and replaced on the next write.
    async fn entries(&self) -> RwLockMappedWriteGuard<'_, Entries> {
        let mut guard = self.entries.write().await;
        if guard.is_none() {
            let loaded = match load_json::<Entries>(&self.path).await {
                Ok(entries) => {
                    debug!(path = %self.path.display(), count = entries.len(), "Loaded cache file");
                    entries
                }
                Err(e) if e.is_not_found() => Entries::new(),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Discarding unreadable cache file"
                    );
                    Entries::new()
                }
            };
            *guard = Some(loaded);
        }
        RwLockWriteGuard::map(guard, |entries| entries.get_or_insert_with(Entries::new))
    }

    async fn persist(&self, entries: &mut Entries) -> Result<(), CacheError> {
        if let Some(retention) = self.retention {
            let now = Utc::now();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(retention, now));
            let pruned = before - entries.len();
            if pruned > 0 {
                debug!(path = %self.path.display(), pruned, "Dropped expired cache entries");
            }
        }
        save_json(&self.path, &*entries).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for JsonFileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries().await.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries().await;
        let touch_only = entries.get(key).is_some_and(|current| {
            current.cached_at == entry.cached_at && current.value == entry.value
        });
        entries.insert(key.to_string(), entry);
        if touch_only {
            return Ok(());
        }
        self.persist(&mut entries).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries().await;
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&mut entries).await?;
        }
        Ok(removed)
    }

    async fn clear(&self, pattern: Option<&str>) -> Result<usize, CacheError> {
        let mut entries = self.entries().await;
        let before = entries.len();
        match pattern {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => entries.clear(),
        }
        let removed = before - entries.len();
        if removed > 0 {
            self.persist(&mut entries).await?;
        }
        debug!(path = %self.path.display(), pattern, removed, "Cleared file cache");
        Ok(removed)
    }

    fn retention(&self) -> Option<Duration> {
        self.retention
    }

    fn evict_on_error(&self) -> Option<bool> {
        self.evict_on_error
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ============================================================================
// Tests
// ============================================================================
