//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid node configuration
    #[error("invalid node: {0}")]
    InvalidNode(String),
    /// Ring operation failed
    #[error("ring operation failed: {0}")]
    RingOperation(String),
}
