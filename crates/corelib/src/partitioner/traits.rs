//! Core partitioner trait definitions.

use std::fmt::Debug;

use crate::token::Token;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead. Output must be a pure
/// function of the input bytes so placement survives process restarts.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Converts a key into a token.
    fn partition(&self, key: &[u8]) -> Token;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
