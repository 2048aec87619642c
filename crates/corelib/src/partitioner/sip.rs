//! SipHash partitioner implementation.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// SipHash-1-3 with fixed zero keys.
///
/// Slower than [`Xxh3Partitioner`](super::Xxh3Partitioner) but keyed, so a
/// deployment can pick its own keys to make point positions unpredictable.
#[derive(Clone, Debug, Default)]
pub struct SipPartitioner {
    k0: u64,
    k1: u64,
}

impl SipPartitioner {
    pub fn with_keys(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl Partitioner for SipPartitioner {
    fn partition(&self, key: &[u8]) -> Token {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        hasher.write(key);
        Token(hasher.finish())
    }

    fn name(&self) -> &'static str {
        "SipPartitioner"
    }
}
