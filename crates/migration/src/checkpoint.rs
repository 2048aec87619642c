//! Progress records for resumable rebalance jobs.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::MigrationError;

/// Opaque progress marker written by a hook when it suspends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Hook-defined position, e.g. the last segment id handled.
    pub cursor: String,
    /// Items processed so far.
    pub processed: u64,
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, job_id: &str) -> Result<Option<Checkpoint>, MigrationError>;

    async fn save(&self, job_id: &str, checkpoint: &Checkpoint) -> Result<(), MigrationError>;

    async fn clear(&self, job_id: &str) -> Result<(), MigrationError>;
}

/// Process-local checkpoints. Progress is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: DashMap<String, Checkpoint>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self, job_id: &str) -> Result<Option<Checkpoint>, MigrationError> {
        Ok(self.entries.get(job_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, job_id: &str, checkpoint: &Checkpoint) -> Result<(), MigrationError> {
        self.entries.insert(job_id.to_owned(), checkpoint.clone());
        Ok(())
    }

    async fn clear(&self, job_id: &str) -> Result<(), MigrationError> {
        self.entries.remove(job_id);
        Ok(())
    }
}
