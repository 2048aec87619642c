//! Rebalance job contract.

use async_trait::async_trait;
use tracing::info;

use crate::change::{ChangeKind, RingChange};
use crate::checkpoint::Checkpoint;
use crate::error::MigrationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// All work for the change is finished.
    Done,
    /// Work stopped early; resume from this checkpoint next run.
    Suspended(Checkpoint),
}

/// Background job run after every ring mutation.
///
/// Implementations must be idempotent: the same change may be delivered
/// more than once, and `resume_from` may be stale. They run concurrently
/// with store/read traffic against the already-mutated ring.
#[async_trait]
pub trait RebalanceHook: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        change: &RingChange,
        resume_from: Option<Checkpoint>,
    ) -> Result<HookOutcome, MigrationError>;
}

/// Records that a migration would start. Moves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyHook;

#[async_trait]
impl RebalanceHook for LogOnlyHook {
    fn name(&self) -> &'static str {
        "log-only"
    }

    async fn run(
        &self,
        change: &RingChange,
        _resume_from: Option<Checkpoint>,
    ) -> Result<HookOutcome, MigrationError> {
        match change.kind {
            ChangeKind::NodeJoined => info!(
                node_id = %change.node_id,
                nodes = change.after.node_count(),
                "starting data migration for new node"
            ),
            ChangeKind::NodeLeft => info!(
                node_id = %change.node_id,
                nodes = change.after.node_count(),
                "starting data migration from removed node"
            ),
        }
        Ok(HookOutcome::Done)
    }
}
