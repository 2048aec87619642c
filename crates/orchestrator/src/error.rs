//! Error types for the orchestrator.
//!
//! A missing segment is not an error: lookups return `Ok(None)`. Everything
//! else is surfaced to the caller unchanged and never retried here.

use std::fmt;
use std::time::Duration;

use crate::backend::BackendError;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// The collaborator call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BlobUpload,
    MetadataWrite,
    CacheWrite,
    IndexWrite,
    CacheRead,
    MetadataRead,
    IndexRead,
    NodeRegistry,
    HealthCheck,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::BlobUpload => "blob upload",
            Stage::MetadataWrite => "metadata write",
            Stage::CacheWrite => "cache write",
            Stage::IndexWrite => "index write",
            Stage::CacheRead => "cache read",
            Stage::MetadataRead => "metadata read",
            Stage::IndexRead => "index read",
            Stage::NodeRegistry => "node registry",
            Stage::HealthCheck => "health check",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// No storage nodes to place on, or invalid settings. Raised before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller supplied an unusable identifier.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A collaborator returned an error.
    #[error("{stage} failed: {source}")]
    Infrastructure {
        stage: Stage,
        #[source]
        source: BackendError,
    },

    /// A collaborator did not answer within the operation timeout.
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    /// A stored record could not be encoded or decoded.
    #[error("malformed record {key}: {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Ring(#[from] corelib::Error),

    #[error(transparent)]
    Replication(#[from] replication::ReplicationError),
}

impl OrchestratorError {
    /// Collaborator call that failed, for infrastructure errors and timeouts.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            OrchestratorError::Infrastructure { stage, .. }
            | OrchestratorError::Timeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The blob was written but a later store step failed.
    ///
    /// Nothing is rolled back: the blob may be orphaned (metadata write) or
    /// the segment missing from its video index (index write).
    pub fn is_partial_write(&self) -> bool {
        matches!(
            self.stage(),
            Some(Stage::MetadataWrite | Stage::CacheWrite | Stage::IndexWrite)
        )
    }
}
