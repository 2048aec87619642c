//! Result of a placement decision.

use corelib::NodeId;

/// Nodes chosen for one key, in ring-selection order (primary first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPlacement {
    pub key: String,
    pub replicas: Vec<NodeId>,
    /// Replication factor the strategy was aiming for.
    pub target: usize,
}

impl ReplicaPlacement {
    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Fewer distinct nodes than the target were available.
    pub fn is_degraded(&self) -> bool {
        self.replicas.len() < self.target
    }

    pub fn primary(&self) -> Option<&NodeId> {
        self.replicas.first()
    }
}
