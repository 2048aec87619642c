//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding nodes responsible for keys.

pub mod builder;
#[allow(clippy::module_inception)]
pub mod ring;
pub mod snapshot;

pub use builder::RingBuilder;
pub use ring::{HashRing, RingUpdate};
pub use snapshot::{Reassignment, RingSnapshot};
