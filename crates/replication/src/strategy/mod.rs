//! Replication strategy abstractions.
//!
//! Replication strategies determine how many replicas to create and where
//! to place them on the ring.
//!
//! - **SimpleStrategy**: N replicas placed on distinct nodes clockwise

pub mod simple;

pub use simple::SimpleStrategy;

use corelib::HashRing;

use crate::placement::ReplicaPlacement;

/// Trait for replication strategies.
///
/// Implementations must be thread-safe (Send + Sync) as one instance is
/// shared by every request the orchestrator serves.
pub trait ReplicationStrategy: Send + Sync + 'static {
    /// Target number of distinct replicas (including the primary).
    fn replication_factor(&self) -> usize;

    /// Find replica nodes for a given key, primary first.
    ///
    /// May return fewer than [`replication_factor`](Self::replication_factor)
    /// nodes when the ring is smaller than the target.
    fn replicas_for_key(&self, ring: &HashRing, key: &str) -> ReplicaPlacement;

    /// Strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}
