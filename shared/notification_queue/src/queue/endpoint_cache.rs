//! Queue name to queue URL cache
//!
//! Entries never expire unless a TTL is configured. A queue that is deleted
//! and recreated out of band keeps its old URL here until the entry is
//! invalidated, expires, or the process restarts.

use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CachedEndpoint {
    url: String,
    resolved_at: Instant,
}

/// Concurrent cache of resolved queue URLs keyed by queue name
#[derive(Debug, Default)]
pub struct EndpointCache {
    entries: DashMap<String, CachedEndpoint>,
    ttl: Option<Duration>,
}

impl EndpointCache {
    /// Creates a cache whose entries live for the lifetime of the process
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache whose entries are re-resolved once older than `ttl`
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Returns the cached URL for `queue_name`, dropping it if it has expired
    #[must_use]
    pub fn get(&self, queue_name: &str) -> Option<String> {
        {
            let entry = self.entries.get(queue_name)?;
            if !self.is_expired(&entry) {
                return Some(entry.url.clone());
            }
        }

        tracing::debug!(queue_name, "Cached queue URL expired");
        self.evict_expired(queue_name);
        None
    }

    fn is_expired(&self, entry: &CachedEndpoint) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.resolved_at.elapsed() >= ttl)
    }

    // The shard lock is released between the read in `get` and this call, so
    // a concurrent `insert` may have refreshed the entry. Only a still-expired
    // entry is removed.
    fn evict_expired(&self, queue_name: &str) {
        self.entries
            .remove_if(queue_name, |_, entry| self.is_expired(entry));
    }

    /// Records the URL resolved for `queue_name`
    pub fn insert(&self, queue_name: &str, url: &str) {
        self.entries.insert(
            queue_name.to_string(),
            CachedEndpoint {
                url: url.to_string(),
                resolved_at: Instant::now(),
            },
        );
    }

    /// Forgets the URL for `queue_name`, forcing the next lookup to go remote
    pub fn invalidate(&self, queue_name: &str) {
        self.entries.remove(queue_name);
    }

    /// Forgets every cached URL
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached entries, including expired ones not yet evicted
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
