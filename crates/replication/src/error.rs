//! Error types for replication strategies.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicationError {
    /// A strategy needs at least one replica.
    #[error("replication factor must be at least 1, got {0}")]
    InvalidFactor(usize),
}
