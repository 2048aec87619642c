//! Shared hash ring with copy-on-write publication.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::Result;
use crate::node::{NodeId, StorageNode};
use crate::partitioner::{Partitioner, Xxh3Partitioner};
use crate::ring::snapshot::RingSnapshot;
use crate::token::Token;

/// Ring states on either side of a membership change.
#[derive(Debug, Clone)]
pub struct RingUpdate {
    pub before: Arc<RingSnapshot>,
    pub after: Arc<RingSnapshot>,
}

/// Consistent hash ring shared by all in-flight requests.
///
/// Readers grab the current [`RingSnapshot`] (an `Arc` clone under a short
/// read lock) and work on it lock-free. Writers are serialized by `writer`,
/// build the next snapshot without blocking readers, then swap it in.
#[derive(Debug)]
pub struct HashRing {
    current: RwLock<Arc<RingSnapshot>>,
    writer: Mutex<()>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRing {
    /// Empty ring using [`Xxh3Partitioner`].
    pub fn new() -> Self {
        Self::with_partitioner(Arc::new(Xxh3Partitioner))
    }

    pub fn with_partitioner(partitioner: Arc<dyn Partitioner>) -> Self {
        Self {
            current: RwLock::new(Arc::new(RingSnapshot::empty(partitioner))),
            writer: Mutex::new(()),
        }
    }

    /// The currently published ring state.
    pub fn snapshot(&self) -> Arc<RingSnapshot> {
        self.current.read().clone()
    }

    /// Add `node`, replacing all points of an earlier registration with the
    /// same id.
    pub fn add_node(&self, node: StorageNode) -> Result<RingUpdate> {
        let _serialized = self.writer.lock();
        let before = self.snapshot();

        let mut next = RingSnapshot::clone(&before);
        let node_id = node.id.clone();
        let vnodes = node.virtual_nodes;
        let replaced = next.contains(&node_id);
        let collisions = next.insert_node(node)?;

        let after = Arc::new(next);
        *self.current.write() = Arc::clone(&after);

        info!(%node_id, vnodes, collisions, replaced, "added node to ring");
        Ok(RingUpdate { before, after })
    }

    /// Remove a node and exactly its points. Returns `None` if it was absent.
    pub fn remove_node(&self, node_id: &str) -> Option<RingUpdate> {
        let _serialized = self.writer.lock();
        let before = self.snapshot();
        if !before.contains(node_id) {
            debug!(%node_id, "remove_node: not on ring");
            return None;
        }

        let mut next = RingSnapshot::clone(&before);
        next.remove_node(node_id);

        let after = Arc::new(next);
        *self.current.write() = Arc::clone(&after);

        info!(%node_id, "removed node from ring");
        Some(RingUpdate { before, after })
    }

    pub fn get_node(&self, key: &str) -> Option<NodeId> {
        self.snapshot().get_node(key).cloned()
    }

    pub fn get_nodes(&self, key: &str, count: usize) -> Vec<NodeId> {
        self.snapshot().get_nodes(key, count)
    }

    pub fn node(&self, node_id: &str) -> Option<StorageNode> {
        self.snapshot().node(node_id).cloned()
    }

    pub fn nodes(&self) -> Vec<StorageNode> {
        self.snapshot().nodes()
    }

    pub fn tokens(&self) -> Vec<(Token, NodeId)> {
        self.snapshot().tokens()
    }

    pub fn node_count(&self) -> usize {
        self.snapshot().node_count()
    }

    pub fn token_count(&self) -> usize {
        self.snapshot().token_count()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.snapshot().partitioner_name()
    }
}
