//! ## Hash/Mix
//! Maps arbitrary byte sequences to well-distributed 64-bit values.
//!
//! Bytes are accumulated with 64-bit FNV-1a and the accumulated state is passed through
//! the MurmurHash3 `fmix64` finalizer. FNV-1a alone leaves weak dependencies between high
//! and low bits, while the estimator takes the register index from the high bits and the
//! rank from the low bits, so the finalizer is always applied.
//!
//! [FNV hash](http://www.isthe.com/chongo/tech/comp/fnv/)
//! [MurmurHash3 finalizer](https://github.com/aappleby/smhasher/wiki/MurmurHash3)

use std::hash::Hasher;

/// FNV-1a 64-bit offset basis
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash byte slice into mixed 64-bit value
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FnvMixHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

/// Hash string into mixed 64-bit value.
///
/// Always equal to `hash_bytes(s.as_bytes())`.
#[inline]
pub fn hash_str(s: &str) -> u64 {
    hash_bytes(s.as_bytes())
}

/// Avalanche finalizer from MurmurHash3
#[inline]
pub(crate) fn fmix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

/// Streaming FNV-1a hasher with `fmix64` applied on `finish`.
///
/// Default hasher of [`CardinalityEstimator`](crate::CardinalityEstimator).
#[derive(Clone, Copy, Debug)]
pub struct FnvMixHasher {
    state: u64,
}

impl FnvMixHasher {
    /// Create new hasher starting from FNV offset basis
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for FnvMixHasher {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvMixHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        fmix64(self.state)
    }
}
