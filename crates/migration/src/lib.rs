//! Rebalancing extension point.
//!
//! Ring membership changes are followed by background work that would move
//! segment replicas to their new owners. This crate defines the contract for
//! that work and runs it detached from the request that changed the ring:
//! - [`RingChange`]: what changed, with ring snapshots on both sides
//! - [`RebalanceHook`]: an idempotent, resumable job
//! - [`CheckpointStore`]: where suspended jobs keep their progress
//! - [`Rebalancer`]: spawns hooks and records their outcome
//!
//! No data movement protocol ships here; [`LogOnlyHook`] only records intent.

pub mod change;
pub mod checkpoint;
pub mod error;
pub mod hook;
pub mod rebalancer;

pub use change::{ChangeKind, RingChange};
pub use checkpoint::{Checkpoint, CheckpointStore, MemoryCheckpointStore};
pub use error::MigrationError;
pub use hook::{HookOutcome, LogOnlyHook, RebalanceHook};
pub use rebalancer::Rebalancer;
