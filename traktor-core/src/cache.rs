//! Cache entries and the storage trait consumed by the cache layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CacheError;
use crate::response::{CacheStamp, Response};

// ============================================================================
// Cache Entry
// ============================================================================

/// A cached response with its timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached response.
    pub value: Response,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
    /// When the entry was last served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Creates an entry written at `cached_at`.
    pub fn new(value: Response, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at,
            accessed_at: None,
        }
    }

    /// Timestamps of this entry.
    pub fn stamp(&self) -> CacheStamp {
        CacheStamp {
            cached_at: self.cached_at,
            accessed_at: self.accessed_at,
        }
    }

    /// Returns true if `cached_at + retention` is still after `now`.
    ///
    /// A retention too large to represent never expires.
    pub fn is_fresh(&self, retention: Duration, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(retention)
            .ok()
            .and_then(|retention| self.cached_at.checked_add_signed(retention))
            .is_none_or(|expires_at| expires_at > now)
    }
}

// ============================================================================
// Cache Store
// ============================================================================

/// Storage backend for cached responses.
///
/// Implementations may be in-memory or persistent; the cache layer awaits
/// every operation either way.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads an entry.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Writes an entry, replacing any previous one.
    async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError>;

    /// Deletes an entry. Returns true if one existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Deletes every entry whose key starts with `pattern`, or every entry
    /// when `pattern` is `None`. Returns the number of entries removed.
    async fn clear(&self, pattern: Option<&str>) -> Result<usize, CacheError>;

    /// Default retention applied when neither the call nor the template sets one.
    fn retention(&self) -> Option<Duration> {
        None
    }

    /// Default evict-on-error flag.
    fn evict_on_error(&self) -> Option<bool> {
        None
    }

    /// Name of this store for logging.
    fn name(&self) -> &str {
        "cache"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fresh() {
        let cached_at = Utc::now();
        let entry = CacheEntry::new(Response::new("u", 200), cached_at);

        let later = cached_at + chrono::Duration::seconds(30);
        assert!(entry.is_fresh(Duration::from_secs(60), later));
        assert!(!entry.is_fresh(Duration::from_secs(10), later));
        assert!(entry.is_fresh(Duration::MAX, later));
    }

    #[test]
    fn test_stamp() {
        let cached_at = Utc::now();
        let mut entry = CacheEntry::new(Response::new("u", 200), cached_at);
        entry.accessed_at = Some(cached_at);
        let stamp = entry.stamp();
        assert_eq!(stamp.cached_at, cached_at);
        assert_eq!(stamp.accessed_at, Some(cached_at));
    }
}
