//! Ring positions.
//!
//! A [`Token`] is a point on a `u64` ring. Tokens are produced by a
//! [`Partitioner`](crate::partitioner::Partitioner) from key bytes and are
//! ordered so the ring can be walked clockwise.

use std::fmt;

/// Position on the hash ring.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Token(pub u64);

impl Token {
    /// Clockwise distance from `self` to `other` on the ring.
    pub fn distance_to(&self, other: &Self) -> u64 {
        other.0.wrapping_sub(self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
