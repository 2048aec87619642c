//! Fluent construction of a pre-populated ring.

use std::sync::Arc;

use crate::error::Result;
use crate::node::{StorageNode, DEFAULT_VIRTUAL_NODES};
use crate::partitioner::{Partitioner, Xxh3Partitioner};
use crate::ring::HashRing;

#[derive(Debug)]
pub struct RingBuilder {
    vnodes: u32,
    partitioner: Arc<dyn Partitioner>,
    nodes: Vec<StorageNode>,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            vnodes: DEFAULT_VIRTUAL_NODES,
            partitioner: Arc::new(Xxh3Partitioner),
            nodes: Vec::new(),
        }
    }

    /// Virtual node count for nodes added through [`add_node`](Self::add_node).
    pub fn with_vnodes(mut self, vnodes: u32) -> Self {
        self.vnodes = vnodes;
        self
    }

    pub fn with_partitioner(mut self, partitioner: Arc<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Add a node using the builder's vnode count.
    pub fn add_node(mut self, id: &str, capacity: u64, endpoint: &str) -> Self {
        self.nodes
            .push(StorageNode::new(id, capacity, endpoint).with_virtual_nodes(self.vnodes));
        self
    }

    /// Add a fully specified node, keeping its own vnode count.
    pub fn add_storage_node(mut self, node: StorageNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> Result<HashRing> {
        let ring = HashRing::with_partitioner(self.partitioner);
        for node in self.nodes {
            ring.add_node(node)?;
        }
        Ok(ring)
    }
}
