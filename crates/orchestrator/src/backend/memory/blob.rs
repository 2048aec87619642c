//! In-memory blob store.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::backend::{BackendError, BackendResult, BlobStore};

#[derive(Debug)]
pub struct MemoryBlobStore {
    objects: DashMap<String, Bytes>,
    /// Prefix for generated URLs.
    base_url: String,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            base_url: base_url.into(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, data: Bytes) -> BackendResult<()> {
        debug!(key, size = data.len(), "storing blob in memory");
        self.objects.insert(key.to_owned(), data);
        Ok(())
    }

    async fn download(&self, key: &str) -> BackendResult<Bytes> {
        self.objects
            .get(key)
            .map(|data| data.value().clone())
            .ok_or_else(|| BackendError::NotFound(key.to_owned()))
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> BackendResult<String> {
        if !self.objects.contains_key(key) {
            return Err(BackendError::NotFound(key.to_owned()));
        }
        Ok(format!(
            "{}/{}?expires={}",
            self.base_url.trim_end_matches('/'),
            key,
            ttl.as_secs()
        ))
    }
}
