//! In-memory cache store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use traktor_core::{CacheEntry, CacheError, CacheStore};

/// Cache store holding entries in process memory.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    retention: Option<Duration>,
    evict_on_error: Option<bool>,
}

impl MemoryCacheStore {
    /// Creates an empty store with no default policy.
    pub fn new() -> Self {
        Self::default()
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

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn clear(&self, pattern: Option<&str>) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        match pattern {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => entries.clear(),
        }
        let removed = before - entries.len();
        debug!(pattern, removed, "Cleared memory cache");
        Ok(removed)
    }

    fn retention(&self) -> Option<Duration> {
        self.retention
    }

    fn evict_on_error(&self) -> Option<bool> {
        self.evict_on_error
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use traktor_core::Response;

    fn entry() -> CacheEntry {
        CacheEntry::new(Response::new("https://api.trakt.tv/movies", 200), Utc::now())
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryCacheStore::new();
        assert!(store.get("a").await.unwrap().is_none());

        store.set("a", entry()).await.unwrap();
        assert!(store.get("a").await.unwrap().is_some());

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_by_prefix() {
        let store = MemoryCacheStore::new();
        for key in ["GET /movies|1", "GET /movies|2", "GET /shows|1"] {
            store.set(key, entry()).await.unwrap();
        }

        assert_eq!(store.clear(Some("GET /movies|")).await.unwrap(), 2);
        assert_eq!(store.keys().await, vec!["GET /shows|1".to_string()]);

        assert_eq!(store.clear(None).await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn test_policy_defaults() {
        let store = MemoryCacheStore::new();
        assert_eq!(store.retention(), None);
        assert_eq!(store.evict_on_error(), None);

        let store = MemoryCacheStore::new()
            .with_retention(Duration::from_secs(60))
            .with_evict_on_error(true);
        assert_eq!(store.retention(), Some(Duration::from_secs(60)));
        assert_eq!(store.evict_on_error(), Some(true));
        assert_eq!(store.name(), "memory");
    }
}
