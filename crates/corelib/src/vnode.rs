//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each physical storage node owns many points on the ring instead of one.
//! With only a handful of physical nodes, a single point each would carve the
//! keyspace into very uneven arcs; spreading 150 points per node smooths the
//! arcs out and bounds remapping to roughly `1/N` of the keys when one node
//! joins or leaves an `N`-node ring.
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(v) where v = number of vnodes per node
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Rebalancing**: about k/N keys move when a node joins/leaves
//!   (k = total keys, N = physical nodes)

use std::fmt;

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// A virtual node on the hash ring.
///
/// Represents a single token position owned by a physical node.
///
/// # Invariants
///
/// - Every `VirtualNode` on a ring has a unique token
/// - Every `VirtualNode` belongs to exactly one physical node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    pub token: Token,

    /// The physical node that owns this virtual node.
    pub node_id: NodeId,
}

impl VirtualNode {
    #[inline]
    pub fn new(token: Token, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Create a virtual node from a node ID and vnode index.
    ///
    /// # Algorithm
    ///
    /// 1. Format the hash input: `"node_id:vnode_index"`, or
    ///    `"node_id:vnode_index#attempt"` when an earlier attempt collided
    /// 2. Hash it with the ring's partitioner
    /// 3. Pair the token with `node_id`
    ///
    /// # Example
    /// ```rust
    /// use corelib::partitioner::Xxh3Partitioner;
    /// use corelib::VirtualNode;
    ///
    /// let vnode0 = VirtualNode::from_index(&Xxh3Partitioner, "node-a", 0, 0);
    /// let vnode1 = VirtualNode::from_index(&Xxh3Partitioner, "node-a", 1, 0);
    /// assert_ne!(vnode0.token, vnode1.token);
    /// ```
    pub fn from_index(
        partitioner: &dyn Partitioner,
        node_id: &str,
        vnode_index: u32,
        attempt: u32,
    ) -> Self {
        let vnode_key = vnode_key(node_id, vnode_index, attempt);
        Self::new(partitioner.partition(vnode_key.as_bytes()), node_id.to_owned())
    }

    /// Clockwise distance to another virtual node.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        self.token.distance_to(&other.token)
    }
}

/// Hash input for a virtual point. Attempt 0 is the canonical `"{id}:{i}"`.
pub fn vnode_key(node_id: &str, vnode_index: u32, attempt: u32) -> String {
    if attempt == 0 {
        format!("{node_id}:{vnode_index}")
    } else {
        format!("{node_id}:{vnode_index}#{attempt}")
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(token={}, node={})", self.token, self.node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioner::Xxh3Partitioner;

    #[test]
    fn test_vnode_key_format() {
        assert_eq!(vnode_key("node-a", 7, 0), "node-a:7");
        assert_eq!(vnode_key("node-a", 7, 2), "node-a:7#2");
    }

    #[test]
    fn test_vnode_from_index() {
        let vnode0 = VirtualNode::from_index(&Xxh3Partitioner, "node-a", 0, 0);
        let vnode1 = VirtualNode::from_index(&Xxh3Partitioner, "node-a", 1, 0);

        assert_ne!(vnode0.token, vnode1.token);
        assert_eq!(vnode0.node_id, vnode1.node_id);
    }

    #[test]
    fn test_perturbed_attempt_moves_the_point() {
        let first = VirtualNode::from_index(&Xxh3Partitioner, "node-a", 3, 0);
        let retry = VirtualNode::from_index(&Xxh3Partitioner, "node-a", 3, 1);
        assert_ne!(first.token, retry.token);
    }

    #[test]
    fn test_vnode_distance_and_ordering() {
        let vnode1 = VirtualNode::new(Token(100), "a".into());
        let vnode2 = VirtualNode::new(Token(200), "b".into());

        assert_eq!(vnode1.distance_to(&vnode2), 100);
        assert!(vnode1 < vnode2);
    }
}
