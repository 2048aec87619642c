//! Fault-injecting collaborators for orchestrator tests.
//!
//! Each wrapper delegates to the in-memory implementation after consulting
//! its [`Faults`], which can fail or delay individual operations and counts
//! every call.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use orchestrator::backend::memory::{MemoryBlobStore, MemoryCache, MemoryMetadataStore};
use orchestrator::backend::BackendResult;
use orchestrator::{
    BackendError, BlobStore, Cache, Collaborators, MetadataStore, OrchestratorConfig,
    SegmentOrchestrator, Watch,
};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct Faults {
    failing: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl Faults {
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().remove(op);
    }

    pub fn delay(&self, op: &'static str, by: Duration) {
        self.delays.lock().insert(op, by);
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    async fn enter(&self, op: &'static str) -> BackendResult<()> {
        *self.calls.lock().entry(op).or_default() += 1;

        let delay = self.delays.lock().get(op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(op) {
            return Err(BackendError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FaultyMetadata {
    pub inner: MemoryMetadataStore,
    pub faults: Faults,
}

#[async_trait]
impl MetadataStore for FaultyMetadata {
    async fn put(&self, key: &str, value: String) -> BackendResult<()> {
        self.faults.enter("put").await?;
        self.inner.put(key, value).await
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.faults.enter("get").await?;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.faults.enter("delete").await?;
        self.inner.delete(key).await
    }

    async fn get_prefix(&self, prefix: &str) -> BackendResult<BTreeMap<String, String>> {
        self.faults.enter("get_prefix").await?;
        self.inner.get_prefix(prefix).await
    }

    async fn watch(&self, key: &str) -> BackendResult<Watch> {
        self.faults.enter("watch").await?;
        self.inner.watch(key).await
    }
}

#[derive(Debug, Default)]
pub struct FaultyCache {
    pub inner: MemoryCache,
    pub faults: Faults,
}

#[async_trait]
impl Cache for FaultyCache {
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> BackendResult<()> {
        self.faults.enter("set").await?;
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.faults.enter("get").await?;
        self.inner.get(key).await
    }

    async fn del(&self, key: &str) -> BackendResult<()> {
        self.faults.enter("del").await?;
        self.inner.del(key).await
    }

    async fn add_to_set(&self, key: &str, members: &[String]) -> BackendResult<()> {
        self.faults.enter("add_to_set").await?;
        self.inner.add_to_set(key, members).await
    }

    async fn members_of(&self, key: &str) -> BackendResult<Vec<String>> {
        self.faults.enter("members_of").await?;
        self.inner.members_of(key).await
    }

    async fn ping(&self) -> BackendResult<()> {
        self.faults.enter("ping").await?;
        self.inner.ping().await
    }
}

#[derive(Debug)]
pub struct FaultyBlobs {
    pub inner: MemoryBlobStore,
    pub faults: Faults,
}

impl Default for FaultyBlobs {
    fn default() -> Self {
        Self {
            inner: MemoryBlobStore::new("memory://test"),
            faults: Faults::default(),
        }
    }
}

#[async_trait]
impl BlobStore for FaultyBlobs {
    async fn upload(&self, key: &str, data: Bytes) -> BackendResult<()> {
        self.faults.enter("upload").await?;
        self.inner.upload(key, data).await
    }

    async fn download(&self, key: &str) -> BackendResult<Bytes> {
        self.faults.enter("download").await?;
        self.inner.download(key).await
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.faults.enter("delete").await?;
        self.inner.delete(key).await
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> BackendResult<String> {
        self.faults.enter("presigned_url").await?;
        self.inner.presigned_url(key, ttl).await
    }
}

/// Shared collaborators; several orchestrators may be built over one harness.
#[derive(Debug, Default, Clone)]
pub struct Harness {
    pub metadata: Arc<FaultyMetadata>,
    pub cache: Arc<FaultyCache>,
    pub blobs: Arc<FaultyBlobs>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            metadata: self.metadata.clone(),
            cache: self.cache.clone(),
            blobs: self.blobs.clone(),
        }
    }

    pub fn orchestrator(&self) -> SegmentOrchestrator {
        self.orchestrator_with(OrchestratorConfig::default())
    }

    pub fn orchestrator_with(&self, config: OrchestratorConfig) -> SegmentOrchestrator {
        SegmentOrchestrator::new(config, self.collaborators()).unwrap()
    }

    /// Calls made to any collaborator.
    pub fn total_calls(&self) -> usize {
        self.metadata.faults.total_calls()
            + self.cache.faults.total_calls()
            + self.blobs.faults.total_calls()
    }
}

/// Orchestrator over `harness` with nodes `node-1..=count` registered.
pub async fn with_nodes(harness: &Harness, count: usize) -> SegmentOrchestrator {
    let orch = harness.orchestrator();
    for i in 1..=count {
        orch.add_storage_node(&format!("node-{i}"), 1000, &format!("10.0.0.{i}:9000"))
            .await
            .unwrap();
    }
    orch
}
