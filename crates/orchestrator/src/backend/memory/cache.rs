//! In-memory cache with TTL expiry.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::backend::{BackendResult, Cache};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

/// Key/value and set cache. Expired values are dropped lazily on read.
///
/// Expiry follows `tokio::time`, so paused-clock tests can advance past TTLs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    values: DashMap<String, CacheEntry>,
    sets: DashMap<String, BTreeSet<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, as a cache restart would.
    pub fn flush(&self) {
        self.values.clear();
        self.sets.clear();
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> BackendResult<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.values
            .insert(key.to_owned(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let now = Instant::now();
        let hit = self
            .values
            .get(key)
            .map(|entry| (entry.is_live(now), entry.value.clone()));

        match hit {
            Some((true, value)) => Ok(Some(value)),
            Some((false, _)) => {
                self.values.remove_if(key, |_, entry| !entry.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn del(&self, key: &str) -> BackendResult<()> {
        self.values.remove(key);
        self.sets.remove(key);
        Ok(())
    }

    async fn add_to_set(&self, key: &str, members: &[String]) -> BackendResult<()> {
        self.sets
            .entry(key.to_owned())
            .or_default()
            .extend(members.iter().cloned());
        Ok(())
    }

    async fn members_of(&self, key: &str) -> BackendResult<Vec<String>> {
        Ok(self
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> BackendResult<()> {
        Ok(())
    }
}
