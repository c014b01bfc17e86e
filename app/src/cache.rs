//! FILENAME: app/src/cache.rs
// PURPOSE: Response cache for backend GETs.
// CONTEXT: The cache is a service owned by DashboardState and injected into
// whatever fetches through it. Entries expire after their own TTL and are
// evicted lazily on lookup.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn insert(&self, key: String, value: Value, ttl: Duration);
    /// Drops every entry whose key contains `pattern`; returns how many.
    fn invalidate(&self, pattern: &str) -> usize;
    fn clear(&self);
}

/// Cache key for a URL and its query parameters.
///
/// `serde_json` maps keep their keys sorted, so equal parameter sets give
/// equal keys regardless of insertion order.
pub fn cache_key(url: &str, params: &Value) -> String {
    match params {
        Value::Null => url.to_string(),
        Value::Object(map) if map.is_empty() => url.to_string(),
        _ => format!("{}|{}", url, params),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// In-memory cache with a per-entry time to live.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TtlCache {
    pub fn new() -> Self {
        TtlCache::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Removes expired entries; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl ResponseCache for TtlCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries();
        let now = Instant::now();
        let fresh = entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone());
        if fresh.is_none() {
            entries.remove(key);
        }
        let counter = if fresh.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        fresh
    }

    fn insert(&self, key: String, value: Value, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries().insert(key, CacheEntry { value, expires_at });
    }

    fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        before - entries.len()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_hit_and_miss() {
        let cache = TtlCache::new();
        assert_eq!(cache.get("/data/map"), None);
        cache.insert("/data/map".to_string(), json!([{"id": 1}]), MINUTE);
        assert_eq!(cache.get("/data/map"), Some(json!([{"id": 1}])));
        assert_eq!(cache.stats(), CacheStats { entries: 1, hits: 1, misses: 1 });
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = TtlCache::new();
        cache.insert("k".to_string(), json!(1), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().entries, 0);

        cache.insert("a".to_string(), json!(1), Duration::ZERO);
        cache.insert("b".to_string(), json!(2), MINUTE);
        assert_eq!(cache.purge_expired(), 1);
    }

    #[test]
    fn test_invalidate_by_pattern() {
        let cache = TtlCache::new();
        cache.insert("/api/user/views".to_string(), json!([]), MINUTE);
        cache.insert("/api/user/views/2".to_string(), json!({}), MINUTE);
        cache.insert("/data/map".to_string(), json!([]), MINUTE);
        assert_eq!(cache.invalidate("/api/user/views"), 2);
        assert!(cache.get("/data/map").is_some());
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_cache_key_ignores_param_order() {
        let a = cache_key("/api/map-data", &json!({"b": 1, "a": 2}));
        let b = cache_key("/api/map-data", &json!({"a": 2, "b": 1}));
        assert_eq!(a, b);
        assert_eq!(cache_key("/data/map", &Value::Null), "/data/map");
    }
}
