//! Segment placement and retrieval.
//!
//! A store runs five ordered steps: choose replicas on the ring, upload the
//! payload, write the metadata record, cache it, then add it to the video
//! index. The steps are not transactional. A failure stops the sequence and
//! leaves earlier writes in place; see [`OrchestratorError::is_partial_write`].

use std::future::Future;
use std::sync::Arc;

use corelib::{HashRing, StorageNode};
use futures::future::join_all;
use migration::{ChangeKind, Rebalancer, RingChange};
use replication::{ReplicationStrategy, SimpleStrategy};
use tracing::{debug, info, warn};

use crate::backend::{BackendResult, BlobStore, Cache, Collaborators, MetadataStore};
use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result, Stage};
use crate::metrics::{self, Operation, OperationTimer, Status};
use crate::segment::{
    blob_key, cache_key, index_key, metadata_key, node_key, now_millis, StoreRequest,
    VideoSegment, NODE_PREFIX,
};

/// Where a successful lookup was answered from.
enum Lookup {
    CacheHit(VideoSegment),
    Loaded(VideoSegment),
    Missing,
}

/// Places segments on storage nodes and tracks their metadata.
///
/// Safe to share across tasks; every method takes `&self`. Ring membership
/// changes are visible to in-flight requests as soon as they are published.
pub struct SegmentOrchestrator {
    ring: Arc<HashRing>,
    strategy: Arc<dyn ReplicationStrategy>,
    metadata: Arc<dyn MetadataStore>,
    cache: Arc<dyn Cache>,
    blobs: Arc<dyn BlobStore>,
    rebalancer: Rebalancer,
    config: OrchestratorConfig,
}

impl SegmentOrchestrator {
    /// Orchestrator with an empty ring, [`SimpleStrategy`] at the configured
    /// replication factor, and the log-only rebalancer.
    pub fn new(config: OrchestratorConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let strategy = SimpleStrategy::new(config.replication_factor)?;
        metrics::describe();

        Ok(Self {
            ring: Arc::new(HashRing::new()),
            strategy: Arc::new(strategy),
            metadata: collaborators.metadata,
            cache: collaborators.cache,
            blobs: collaborators.blobs,
            rebalancer: Rebalancer::log_only(),
            config,
        })
    }

    /// Share an existing ring instead of starting empty.
    pub fn with_ring(mut self, ring: Arc<HashRing>) -> Self {
        self.ring = ring;
        self
    }

    pub fn with_rebalancer(mut self, rebalancer: Rebalancer) -> Self {
        self.rebalancer = rebalancer;
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ReplicationStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn ring(&self) -> &Arc<HashRing> {
        &self.ring
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one collaborator call under the operation timeout.
    async fn bounded<T, F>(&self, stage: Stage, call: F) -> Result<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        let after = self.config.operation_timeout();
        match tokio::time::timeout(after, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(OrchestratorError::Infrastructure { stage, source }),
            Err(_) => Err(OrchestratorError::Timeout { stage, after }),
        }
    }

    /// Store a segment with the default quality at sequence 0.
    pub async fn store_segment(
        &self,
        video_id: &str,
        segment_id: &str,
        payload: impl Into<bytes::Bytes>,
    ) -> Result<VideoSegment> {
        self.store_segment_with(StoreRequest::new(video_id, segment_id, payload))
            .await
    }

    /// Store a segment and return the record that was written.
    ///
    /// Fails with [`OrchestratorError::Configuration`] before any I/O when
    /// the ring is empty. Dropping the returned future stops the sequence at
    /// the step in progress; later steps are never started.
    pub async fn store_segment_with(&self, request: StoreRequest) -> Result<VideoSegment> {
        let timer = OperationTimer::start(Operation::Store);
        let video_id = request.video_id.clone();
        let segment_id = request.segment_id.clone();

        match self.store_steps(request).await {
            Ok(segment) => {
                timer.finish(Status::Success);
                Ok(segment)
            }
            Err(e) => {
                warn!(%video_id, %segment_id, error = %e, "failed to store segment");
                timer.finish(Status::Failed);
                Err(e)
            }
        }
    }

    async fn store_steps(&self, request: StoreRequest) -> Result<VideoSegment> {
        if request.video_id.is_empty() || request.segment_id.is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "video id and segment id must not be empty".into(),
            ));
        }

        let placement = self
            .strategy
            .replicas_for_key(&self.ring, &request.segment_id);
        if placement.is_empty() {
            return Err(OrchestratorError::Configuration(
                "no storage nodes available".into(),
            ));
        }

        let StoreRequest {
            video_id,
            segment_id,
            payload,
            quality,
            sequence,
        } = request;
        let blob_key = blob_key(&video_id, &segment_id);
        let size = payload.len() as u64;

        self.bounded(Stage::BlobUpload, self.blobs.upload(&blob_key, payload))
            .await?;

        let segment = VideoSegment {
            segment_id,
            video_id,
            quality: quality.unwrap_or_else(|| self.config.default_quality.clone()),
            sequence,
            blob_key,
            node_ids: placement.replicas,
            size,
            created_at: now_millis(),
        };

        let key = metadata_key(&segment.segment_id);
        let record = serde_json::to_string(&segment)
            .map_err(|source| OrchestratorError::Codec { key: key.clone(), source })?;

        self.bounded(Stage::MetadataWrite, self.metadata.put(&key, record.clone()))
            .await?;

        self.bounded(
            Stage::CacheWrite,
            self.cache.set(
                &cache_key(&segment.segment_id),
                record,
                Some(self.config.cache_ttl()),
            ),
        )
        .await?;

        self.bounded(
            Stage::IndexWrite,
            self.cache.add_to_set(
                &index_key(&segment.video_id),
                std::slice::from_ref(&segment.segment_id),
            ),
        )
        .await?;

        info!(
            segment_id = %segment.segment_id,
            video_id = %segment.video_id,
            replicas = ?segment.node_ids,
            size,
            "stored segment"
        );
        Ok(segment)
    }

    /// Segment metadata, or `None` if no record exists. Never returns payload
    /// bytes.
    pub async fn get_segment(&self, segment_id: &str) -> Result<Option<VideoSegment>> {
        let timer = OperationTimer::start(Operation::Retrieve);

        match self.lookup(segment_id).await {
            Ok(Lookup::CacheHit(segment)) => {
                timer.finish(Status::CacheHit);
                Ok(Some(segment))
            }
            Ok(Lookup::Loaded(segment)) => {
                timer.finish(Status::Success);
                Ok(Some(segment))
            }
            Ok(Lookup::Missing) => {
                timer.finish(Status::NotFound);
                Ok(None)
            }
            Err(e) => {
                warn!(%segment_id, error = %e, "failed to retrieve segment");
                timer.finish(Status::Failed);
                Err(e)
            }
        }
    }

    async fn lookup(&self, segment_id: &str) -> Result<Lookup> {
        let cache_key = cache_key(segment_id);

        let cached = self
            .bounded(Stage::CacheRead, self.cache.get(&cache_key))
            .await?;
        if let Some(raw) = cached {
            let segment: VideoSegment = serde_json::from_str(&raw)
                .map_err(|source| OrchestratorError::Codec { key: cache_key, source })?;
            return Ok(Lookup::CacheHit(segment));
        }

        let key = metadata_key(segment_id);
        let Some(raw) = self
            .bounded(Stage::MetadataRead, self.metadata.get(&key))
            .await?
        else {
            debug!(%segment_id, "segment not found");
            return Ok(Lookup::Missing);
        };

        let segment: VideoSegment = serde_json::from_str(&raw)
            .map_err(|source| OrchestratorError::Codec { key, source })?;

        self.bounded(
            Stage::CacheWrite,
            self.cache.set(&cache_key, raw, Some(self.config.cache_ttl())),
        )
        .await?;

        Ok(Lookup::Loaded(segment))
    }

    /// Every resolvable segment indexed under `video_id`, ordered by
    /// sequence number.
    ///
    /// Segments whose metadata is missing or fails to load are skipped.
    pub async fn get_video_segments(&self, video_id: &str) -> Result<Vec<VideoSegment>> {
        let ids = self
            .bounded(Stage::IndexRead, self.cache.members_of(&index_key(video_id)))
            .await?;

        let results = join_all(ids.iter().map(|id| self.get_segment(id))).await;

        let mut segments = Vec::with_capacity(ids.len());
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(Some(segment)) => segments.push(segment),
                Ok(None) => debug!(%video_id, segment_id = %id, "indexed segment has no metadata"),
                Err(e) => {
                    warn!(%video_id, segment_id = %id, error = %e, "skipping unreadable segment")
                }
            }
        }

        segments.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.segment_id.cmp(&b.segment_id))
        });
        Ok(segments)
    }

    /// Join a node with the configured virtual node count.
    pub async fn add_storage_node(
        &self,
        node_id: &str,
        capacity: u64,
        endpoint: &str,
    ) -> Result<StorageNode> {
        let node = StorageNode::new(node_id, capacity, endpoint)
            .with_virtual_nodes(self.config.virtual_nodes);
        self.register_node(node).await
    }

    /// Join `node` to the ring, persist it, then schedule rebalancing.
    ///
    /// The ring is updated first so placements see the node immediately. If
    /// the registry write fails the node stays on the ring and no rebalance
    /// is scheduled.
    pub async fn register_node(&self, node: StorageNode) -> Result<StorageNode> {
        let update = self.ring.add_node(node.clone())?;

        let key = node_key(&node.id);
        let record = serde_json::to_string(&node)
            .map_err(|source| OrchestratorError::Codec { key: key.clone(), source })?;
        self.bounded(Stage::NodeRegistry, self.metadata.put(&key, record))
            .await?;

        self.rebalancer
            .trigger(RingChange::new(ChangeKind::NodeJoined, node.id.clone(), update));

        info!(node_id = %node.id, capacity = node.capacity, endpoint = %node.endpoint, "added storage node");
        Ok(node)
    }

    /// Remove a node from the ring and the registry.
    ///
    /// Returns `false` if the node was not on the ring; any stale registry
    /// record is deleted either way.
    pub async fn remove_storage_node(&self, node_id: &str) -> Result<bool> {
        let update = self.ring.remove_node(node_id);

        self.bounded(Stage::NodeRegistry, self.metadata.delete(&node_key(node_id)))
            .await?;

        match update {
            Some(update) => {
                self.rebalancer
                    .trigger(RingChange::new(ChangeKind::NodeLeft, node_id, update));
                info!(%node_id, "removed storage node");
                Ok(true)
            }
            None => {
                debug!(%node_id, "remove requested for unknown node");
                Ok(false)
            }
        }
    }

    /// Current ring members, ordered by id.
    pub fn get_storage_nodes(&self) -> Vec<StorageNode> {
        self.ring.nodes()
    }

    /// Load the durable node registry into the ring.
    ///
    /// Meant for startup. Malformed or unplaceable records are skipped with a
    /// warning. No rebalance is scheduled. Returns the number of nodes added.
    pub async fn recover_nodes(&self) -> Result<usize> {
        let records = self
            .bounded(Stage::NodeRegistry, self.metadata.get_prefix(NODE_PREFIX))
            .await?;

        let mut recovered = 0;
        for (key, raw) in records {
            let node: StorageNode = match serde_json::from_str(&raw) {
                Ok(node) => node,
                Err(e) => {
                    warn!(%key, error = %e, "skipping malformed node record");
                    continue;
                }
            };
            match self.ring.add_node(node) {
                Ok(_) => recovered += 1,
                Err(e) => warn!(%key, error = %e, "skipping node record"),
            }
        }

        info!(recovered, "recovered storage nodes from registry");
        Ok(recovered)
    }

    /// Readiness probe: the cache must answer a ping.
    pub async fn ready(&self) -> Result<()> {
        self.bounded(Stage::HealthCheck, self.cache.ping()).await
    }
}

impl std::fmt::Debug for SegmentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentOrchestrator")
            .field("nodes", &self.ring.node_count())
            .field("strategy", &self.strategy.name())
            .field("rebalancer", &self.rebalancer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
