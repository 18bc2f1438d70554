//! Role graph cache contract and the default in-memory backend

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::graph::RoleGraph;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable role graph caching
    pub enabled: bool,

    /// Time-to-live for cached graphs, in seconds (`0` means no expiry)
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// TTL as a duration, `None` when entries never expire
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Storage contract for role graph snapshots
///
/// Entries are whole `Arc<RoleGraph>` snapshots, so a reader sees either the
/// old graph or the new one, never a half-updated mix. Invalidation always
/// drops every entry and advances the generation.
pub trait RoleCache: Send + Sync {
    /// Returns the cached graph stored under `key`, if present and fresh
    fn get(&self, key: &str) -> Option<Arc<RoleGraph>>;

    /// Stores a graph snapshot under `key`
    fn put(&self, key: &str, graph: Arc<RoleGraph>);

    /// Current generation, advanced by every [`invalidate_all`](RoleCache::invalidate_all)
    fn generation(&self) -> u64;

    /// Stores `graph` only if no invalidation happened since `generation` was read
    ///
    /// Returns `false` when the snapshot was discarded as stale.
    fn put_if_current(&self, key: &str, graph: Arc<RoleGraph>, generation: u64) -> bool;

    /// Drops every cached graph
    fn invalidate_all(&self);

    /// Current statistics
    fn stats(&self) -> CacheStats;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    graph: Arc<RoleGraph>,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.created_at.elapsed() > ttl)
    }
}

/// Thread-safe in-memory [`RoleCache`] backed by `DashMap`
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use rbac::role::{InMemoryRoleCache, RoleCache, RoleGraph};
///
/// let cache = InMemoryRoleCache::new(None);
/// cache.put("rbac.roles", Arc::new(RoleGraph::new()));
/// assert!(cache.get("rbac.roles").is_some());
///
/// cache.invalidate_all();
/// assert!(cache.get("rbac.roles").is_none());
/// ```
#[derive(Debug)]
pub struct InMemoryRoleCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    generation: AtomicU64,
}

impl InMemoryRoleCache {
    /// Creates a cache whose entries expire after `ttl` (never, when `None`)
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Creates a cache from configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl())
    }
}

impl Default for InMemoryRoleCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl RoleCache for InMemoryRoleCache {
    fn get(&self, key: &str) -> Option<Arc<RoleGraph>> {
        let fresh = self.entries.get(key).and_then(|entry| {
            (!entry.is_expired(self.ttl)).then(|| Arc::clone(&entry.graph))
        });

        match fresh {
            Some(graph) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(graph)
            }
            None => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(self.ttl));
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: &str, graph: Arc<RoleGraph>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                graph,
                created_at: Instant::now(),
            },
        );
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn put_if_current(&self, key: &str, graph: Arc<RoleGraph>, generation: u64) -> bool {
        // The shard lock is held across the check, so a concurrent
        // invalidation either rejects this put or clears it afterwards.
        let entry = self.entries.entry(key.to_string());
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key, "discarding role graph loaded before invalidation");
            return false;
        }
        entry.insert(CacheEntry {
            graph,
            created_at: Instant::now(),
        });
        true
    }

    fn invalidate_all(&self) {
        // Advance first: loads started before this point can no longer store
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!("role graph cache invalidated");
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = InMemoryRoleCache::new(None);
        assert!(cache.get("roles").is_none());

        cache.put("roles", Arc::new(RoleGraph::new()));
        assert!(cache.get("roles").is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = InMemoryRoleCache::new(Some(Duration::from_millis(50)));
        cache.put("roles", Arc::new(RoleGraph::new()));
        assert!(cache.get("roles").is_some());

        std::thread::sleep(Duration::from_millis(100));

        assert!(cache.get("roles").is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_invalidate_all_drops_every_key() {
        let cache = InMemoryRoleCache::new(None);
        cache.put("a", Arc::new(RoleGraph::new()));
        cache.put("b", Arc::new(RoleGraph::new()));

        cache.invalidate_all();

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_none());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_put_if_current_rejects_stale_generation() {
        let cache = InMemoryRoleCache::new(None);
        let before = cache.generation();

        cache.invalidate_all();
        assert_eq!(cache.generation(), before + 1);

        assert!(!cache.put_if_current("roles", Arc::new(RoleGraph::new()), before));
        assert!(cache.get("roles").is_none());

        assert!(cache.put_if_current("roles", Arc::new(RoleGraph::new()), cache.generation()));
        assert!(cache.get("roles").is_some());
    }

    #[test]
    fn test_config_ttl() {
        let config = CacheConfig {
            enabled: true,
            ttl_secs: 0,
        };
        assert!(config.ttl().is_none());
        assert_eq!(CacheConfig::default().ttl(), Some(Duration::from_secs(60)));
    }
}
