//! Replication strategies for segment placement.
//!
//! This crate decides how many replicas a segment gets and which ring nodes
//! hold them. It never performs I/O; the orchestrator acts on the resulting
//! [`ReplicaPlacement`].

pub mod error;
pub mod placement;
pub mod strategy;

pub use error::ReplicationError;
pub use placement::ReplicaPlacement;
pub use strategy::{ReplicationStrategy, SimpleStrategy};
