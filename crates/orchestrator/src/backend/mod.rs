//! Collaborator contracts.
//!
//! The orchestrator only depends on these traits. Each is `Send + Sync` so a
//! single `Arc<dyn _>` can be shared by every concurrent request.

pub mod memory;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Errors reported by a collaborator.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The backend refused the request.
    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Change notification from [`MetadataStore::watch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Put { key: String, value: String },
    Delete { key: String },
}

/// Stream of changes to one key. Dropping it cancels the watch.
pub type Watch = mpsc::UnboundedReceiver<WatchEvent>;

/// Strongly consistent, durable key/value store with prefix scans.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn put(&self, key: &str, value: String) -> BackendResult<()>;

    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    async fn delete(&self, key: &str) -> BackendResult<()>;

    /// All entries whose key starts with `prefix`, ordered by key.
    async fn get_prefix(&self, prefix: &str) -> BackendResult<BTreeMap<String, String>>;

    /// Subscribe to puts and deletes of `key`.
    async fn watch(&self, key: &str) -> BackendResult<Watch>;
}

/// Cache with TTL expiry and set values.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Store `value`; `ttl = None` keeps it until evicted.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> BackendResult<()>;

    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    async fn del(&self, key: &str) -> BackendResult<()>;

    async fn add_to_set(&self, key: &str, members: &[String]) -> BackendResult<()>;

    async fn members_of(&self, key: &str) -> BackendResult<Vec<String>>;

    async fn ping(&self) -> BackendResult<()>;
}

/// Durable payload storage addressed by key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, data: Bytes) -> BackendResult<()>;

    /// Fails with [`BackendError::NotFound`] for unknown keys.
    async fn download(&self, key: &str) -> BackendResult<Bytes>;

    async fn delete(&self, key: &str) -> BackendResult<()>;

    /// Time-limited URL a client can fetch the payload from directly.
    async fn presigned_url(&self, key: &str, ttl: Duration) -> BackendResult<String>;
}

/// The three collaborators an orchestrator is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub metadata: Arc<dyn MetadataStore>,
    pub cache: Arc<dyn Cache>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Collaborators {
    /// Fresh in-memory collaborators.
    pub fn in_memory() -> Self {
        Self {
            metadata: Arc::new(memory::MemoryMetadataStore::new()),
            cache: Arc::new(memory::MemoryCache::new()),
            blobs: Arc::new(memory::MemoryBlobStore::new("memory://segments")),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
