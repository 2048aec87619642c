//! Segment orchestrator: replicated placement and retrieval of video segments.
//!
//! [`SegmentOrchestrator`] picks replica nodes on the shared
//! [`HashRing`](corelib::HashRing), then sequences each request across three
//! injected collaborators:
//!
//! - [`BlobStore`]: durable segment payloads
//! - [`MetadataStore`]: durable segment records and the node registry
//! - [`Cache`]: hot-path segment records and the per-video segment index
//!
//! In-memory collaborators live in [`backend::memory`] for tests and local
//! runs; production clients implement the same traits elsewhere.

pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod segment;

pub use backend::{
    BackendError, BlobStore, Cache, Collaborators, MetadataStore, Watch, WatchEvent,
};
pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result, Stage};
pub use orchestrator::SegmentOrchestrator;
pub use segment::{StoreRequest, VideoSegment};
