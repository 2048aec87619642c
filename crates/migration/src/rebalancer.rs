//! Detached execution of rebalance hooks.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::change::RingChange;
use crate::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use crate::error::MigrationError;
use crate::hook::{HookOutcome, LogOnlyHook, RebalanceHook};

/// Spawns a [`RebalanceHook`] for each ring change.
///
/// Failures are logged and never reach the caller that mutated the ring;
/// membership is not rolled back.
#[derive(Clone)]
pub struct Rebalancer {
    hook: Arc<dyn RebalanceHook>,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl Rebalancer {
    pub fn new(hook: Arc<dyn RebalanceHook>, checkpoints: Arc<dyn CheckpointStore>) -> Self {
        Self { hook, checkpoints }
    }

    /// [`LogOnlyHook`] with in-memory checkpoints.
    pub fn log_only() -> Self {
        Self::new(Arc::new(LogOnlyHook), Arc::new(MemoryCheckpointStore::new()))
    }

    pub fn hook_name(&self) -> &'static str {
        self.hook.name()
    }

    /// Run the hook for `change` in the background.
    ///
    /// Must be called from within a Tokio runtime. The returned handle can be
    /// awaited by tests; production callers drop it.
    pub fn trigger(&self, change: RingChange) -> JoinHandle<()> {
        let hook = Arc::clone(&self.hook);
        let checkpoints = Arc::clone(&self.checkpoints);
        debug!(job = %change.job_id(), hook = hook.name(), "scheduling rebalance");

        tokio::spawn(async move {
            let job_id = change.job_id();
            if let Err(e) = run_job(hook.as_ref(), checkpoints.as_ref(), &change).await {
                error!(job = %job_id, hook = hook.name(), error = %e, "rebalance failed");
            }
        })
    }
}

async fn run_job(
    hook: &dyn RebalanceHook,
    checkpoints: &dyn CheckpointStore,
    change: &RingChange,
) -> Result<(), MigrationError> {
    let job_id = change.job_id();
    let resume_from = checkpoints.load(&job_id).await?;
    if let Some(checkpoint) = &resume_from {
        info!(job = %job_id, processed = checkpoint.processed, "resuming rebalance");
    }

    match hook.run(change, resume_from).await? {
        HookOutcome::Done => {
            checkpoints.clear(&job_id).await?;
            debug!(job = %job_id, "rebalance complete");
        }
        HookOutcome::Suspended(checkpoint) => {
            info!(job = %job_id, processed = checkpoint.processed, "rebalance suspended");
            checkpoints.save(&job_id, &checkpoint).await?;
        }
    }
    Ok(())
}

impl std::fmt::Debug for Rebalancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rebalancer")
            .field("hook", &self.hook.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use crate::checkpoint::Checkpoint;
    use async_trait::async_trait;
    use corelib::{HashRing, StorageNode};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Processes two items per run, suspending in between.
    struct CountingHook {
        runs: AtomicU32,
    }

    #[async_trait]
    impl RebalanceHook for CountingHook {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(
            &self,
            _change: &RingChange,
            resume_from: Option<Checkpoint>,
        ) -> Result<HookOutcome, MigrationError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let processed = resume_from.map_or(0, |c| c.processed) + 2;
            if processed >= 4 {
                Ok(HookOutcome::Done)
            } else {
                Ok(HookOutcome::Suspended(Checkpoint {
                    cursor: format!("item-{processed}"),
                    processed,
                }))
            }
        }
    }

    struct FailingHook;

    #[async_trait]
    impl RebalanceHook for FailingHook {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn run(
            &self,
            _change: &RingChange,
            _resume_from: Option<Checkpoint>,
        ) -> Result<HookOutcome, MigrationError> {
            Err(MigrationError::Hook {
                hook: "failing",
                message: "target unreachable".into(),
            })
        }
    }

    fn join_change() -> RingChange {
        let ring = HashRing::new();
        let update = ring
            .add_node(StorageNode::new("A", 10, "a").with_virtual_nodes(4))
            .unwrap();
        RingChange::new(ChangeKind::NodeJoined, "A", update)
    }

    #[tokio::test]
    async fn test_suspended_job_resumes_from_checkpoint() {
        let hook = Arc::new(CountingHook {
            runs: AtomicU32::new(0),
        });
        let checkpoints = Arc::new(MemoryCheckpointStore::new());
        let rebalancer = Rebalancer::new(hook.clone(), checkpoints.clone());
        let change = join_change();

        rebalancer.trigger(change.clone()).await.unwrap();
        let saved = checkpoints.load(&change.job_id()).await.unwrap();
        assert_eq!(saved.map(|c| c.processed), Some(2));

        rebalancer.trigger(change.clone()).await.unwrap();
        assert!(checkpoints.load(&change.job_id()).await.unwrap().is_none());
        assert_eq!(hook.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_hook_is_contained() {
        let rebalancer = Rebalancer::new(
            Arc::new(FailingHook),
            Arc::new(MemoryCheckpointStore::new()),
        );
        // The task itself completes; the error is only logged.
        rebalancer.trigger(join_change()).await.unwrap();
    }

    #[tokio::test]
    async fn test_log_only_hook_finishes() {
        let rebalancer = Rebalancer::log_only();
        assert_eq!(rebalancer.hook_name(), "log-only");
        rebalancer.trigger(join_change()).await.unwrap();
    }

    #[test]
    fn test_job_id_names_kind_and_node() {
        assert_eq!(join_change().job_id(), "node-joined/A");
    }
}
