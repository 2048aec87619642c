//! In-memory collaborators.
//!
//! Useful for tests and for running the orchestrator without external
//! services. Nothing here survives a restart.

mod blob;
mod cache;
mod metadata;

pub use blob::MemoryBlobStore;
pub use cache::MemoryCache;
pub use metadata::MemoryMetadataStore;
