//! Core library for consistent hashing of media segments.
//!
//! This crate provides the placement primitives used by the orchestrator:
//! - Tokens and partitioners (key bytes to ring positions)
//! - Storage nodes and their virtual nodes
//! - The shared hash ring and its immutable snapshots

pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod vnode;

pub use error::{Error, Result};
pub use node::{NodeId, StorageNode, DEFAULT_VIRTUAL_NODES};
pub use partitioner::Partitioner;
pub use ring::{HashRing, Reassignment, RingBuilder, RingSnapshot, RingUpdate};
pub use token::Token;
pub use vnode::VirtualNode;
