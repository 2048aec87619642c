//! Simple replication strategy.
//!
//! Places N replicas on the first N distinct nodes met walking clockwise
//! from the key's position. Suited to single data center deployments where
//! failure domains are not modelled.
//!
//! # Performance
//!
//! - **Time**: O(log n + w) where n = tokens and w = points walked until N
//!   distinct owners are found
//! - **Space**: O(r) - returns the chosen node ids

use corelib::HashRing;
use tracing::warn;

use crate::error::ReplicationError;
use crate::placement::ReplicaPlacement;
use crate::strategy::ReplicationStrategy;

#[derive(Debug, Clone)]
pub struct SimpleStrategy {
    /// Number of replicas to create (including primary).
    replication_factor: usize,
}

impl SimpleStrategy {
    /// Create a new simple strategy with the given replication factor.
    ///
    /// * 1: No replication (single copy)
    /// * 3: Standard (primary + 2 replicas)
    pub fn new(replication_factor: usize) -> Result<Self, ReplicationError> {
        if replication_factor == 0 {
            return Err(ReplicationError::InvalidFactor(replication_factor));
        }
        Ok(Self { replication_factor })
    }
}

impl Default for SimpleStrategy {
    fn default() -> Self {
        Self {
            replication_factor: 3,
        }
    }
}

impl ReplicationStrategy for SimpleStrategy {
    fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    fn replicas_for_key(&self, ring: &HashRing, key: &str) -> ReplicaPlacement {
        let replicas = ring.get_nodes(key, self.replication_factor);
        let placement = ReplicaPlacement {
            key: key.to_owned(),
            replicas,
            target: self.replication_factor,
        };

        if !placement.is_empty() && placement.is_degraded() {
            warn!(
                key,
                replicas = placement.replicas.len(),
                target = self.replication_factor,
                "placement below target replication factor"
            );
        }

        placement
    }

    fn name(&self) -> &'static str {
        "SimpleStrategy"
    }
}
