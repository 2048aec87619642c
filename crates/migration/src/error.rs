//! Error types for rebalance jobs.

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A hook gave up on a change.
    #[error("rebalance hook {hook} failed: {message}")]
    Hook {
        hook: &'static str,
        message: String,
    },

    /// Progress could not be loaded or saved.
    #[error("checkpoint store error: {0}")]
    Checkpoint(String),
}
