//! Storage node descriptors.
//!
//! A [`StorageNode`] is the unit of membership on the ring. It is small and
//! cheap to clone; the ring keeps one copy per registered node and the
//! orchestrator persists another as JSON for restart recovery.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a storage node.
pub type NodeId = String;

/// Virtual points a node gets when no explicit count is configured.
pub const DEFAULT_VIRTUAL_NODES: u32 = 150;

fn default_virtual_nodes() -> u32 {
    DEFAULT_VIRTUAL_NODES
}

/// A physical storage node participating in segment placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Advertised capacity (GB). Informational at this layer.
    pub capacity: u64,
    /// Address the node is reachable at.
    pub endpoint: String,
    /// Number of points this node owns on the ring.
    #[serde(default = "default_virtual_nodes")]
    pub virtual_nodes: u32,
}

impl StorageNode {
    /// Construct a node with the default virtual node count.
    pub fn new(id: impl Into<NodeId>, capacity: u64, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capacity,
            endpoint: endpoint.into(),
            virtual_nodes: DEFAULT_VIRTUAL_NODES,
        }
    }

    /// Override the number of ring points this node owns.
    pub fn with_virtual_nodes(mut self, virtual_nodes: u32) -> Self {
        self.virtual_nodes = virtual_nodes;
        self
    }

    /// Reject nodes the ring cannot place.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidNode("node id must not be empty".into()));
        }
        if self.virtual_nodes == 0 {
            return Err(Error::InvalidNode(format!(
                "node {} must own at least one virtual node",
                self.id
            )));
        }
        Ok(())
    }
}
