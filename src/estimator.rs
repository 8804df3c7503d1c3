//! Cardinality estimator allows to estimate number of distinct elements
//! in the stream or dataset and is defined with runtime `precision` parameter:
//! - `precision` (`P`) in [4..18] range, which defines number of bits
//!   of the hash to use for HyperLogLog register indices (`M = 2^P` registers).
//!
//! # Data-structure design rationale
//!
//! ## Fixed memory footprint
//! Registers are allocated once at construction time and packed using 6 bits each,
//! which is enough to store any rank produced by a 64-bit hash:
//! - P = 4:  16 registers - 16 bytes
//! - P = 12: 4096 registers - 3076 bytes
//! - P = 18: 262144 registers - 196612 bytes
//!
//! ## Mergeability
//! Registers only ever grow. Merging two estimators of the same precision takes
//! the pointwise maximum of their registers, which is exactly the state a single
//! estimator would reach after observing both streams.
//!
//! ## Accuracy
//! Standard HyperLogLog estimate with linear counting for small cardinalities
//! and large range correction computed against the 64-bit hash space.
//!   - Expected error:
//!     P = 10: 1.04 / sqrt(2^10) = 3.25%
//!     P = 12: 1.04 / sqrt(2^12) = 1.62%
//!     P = 14: 1.04 / sqrt(2^14) = 0.81%
//!     P = 18: 1.04 / sqrt(2^18) = 0.20%
//!
//! [Original HyperLogLog paper](https://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)

use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::mem::size_of;

use crate::error::{Error, Result};
use crate::hash::FnvMixHasher;
use crate::registers::Registers;

/// Minimum supported precision
pub const MIN_PRECISION: u8 = 4;
/// Maximum supported precision
pub const MAX_PRECISION: u8 = 18;
/// Precision used by `CardinalityEstimator::default()`
pub const DEFAULT_PRECISION: u8 = 12;

/// Size of the hash space used for large range correction (`2^64`)
const HASH_SPACE: f64 = 18_446_744_073_709_551_616.0;

/// HyperLogLog estimator over items hashed with `H`.
///
/// Estimators only merge with estimators of the same precision and hasher type.
pub struct CardinalityEstimator<H: Hasher + Default = FnvMixHasher> {
    /// Number of hash bits used for register index
    precision: u8,
    /// HyperLogLog registers
    registers: Registers,
    /// Zero-sized build hasher
    build_hasher: BuildHasherDefault<H>,
}

impl<H: Hasher + Default> CardinalityEstimator<H> {
    /// Creates new instance of `CardinalityEstimator` with `2^precision` registers
    #[inline]
    pub fn new(precision: u8) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            tracing::debug!(precision, "rejected estimator precision");
            return Err(Error::InvalidPrecision(precision));
        }

        Ok(Self::from_registers(precision, Registers::new(1 << precision)))
    }

    /// Create estimator from already validated precision and registers
    #[inline]
    pub(crate) fn from_registers(precision: u8, registers: Registers) -> Self {
        debug_assert_eq!(registers.len(), 1 << precision);
        Self {
            precision,
            registers,
            build_hasher: BuildHasherDefault::default(),
        }
    }

    /// Return precision of `CardinalityEstimator`
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Return number of registers (`2^precision`)
    #[inline]
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Return register ranks in index order
    #[inline]
    pub fn registers(&self) -> impl Iterator<Item = u8> + '_ {
        // ranks never exceed `max_rank` which fits into 6 bits
        self.registers.iter().map(|r| r as u8)
    }

    /// Maximum rank a register can hold for this precision
    #[inline]
    pub fn max_rank(&self) -> u8 {
        max_rank(self.precision)
    }

    /// Insert byte slice into `CardinalityEstimator`
    #[inline]
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        let mut hasher = self.build_hasher.build_hasher();
        hasher.write(bytes);
        self.insert_hash(hasher.finish());
    }

    /// Insert string into `CardinalityEstimator`.
    ///
    /// Strings are hashed by their UTF-8 bytes, so `insert_str(s)`
    /// is equivalent to `insert_bytes(s.as_bytes())`.
    #[inline]
    pub fn insert_str(&mut self, s: &str) {
        self.insert_bytes(s.as_bytes());
    }

    /// Insert a hashable item into `CardinalityEstimator`.
    ///
    /// Item is fed through its `Hash` implementation, which may differ from its raw bytes
    /// (e.g. `str` appends a terminator), so don't mix `insert` and `insert_str` for the same stream.
    #[inline]
    pub fn insert<T: Hash + ?Sized>(&mut self, item: &T) {
        let hash = self.build_hasher.hash_one(item);
        self.insert_hash(hash);
    }

    /// Insert hash into `CardinalityEstimator`.
    ///
    /// Hash is expected to be well mixed: its high bits select the register
    /// and its low bits determine the rank.
    #[inline]
    pub fn insert_hash(&mut self, hash: u64) {
        let (idx, rank) = self.index_and_rank(hash);
        self.registers.update(idx, rank);
    }

    /// Split hash into register index (top `P` bits) and rank of the remaining `64 - P` bits
    #[inline]
    fn index_and_rank(&self, hash: u64) -> (usize, u32) {
        let p = u32::from(self.precision);
        let idx = (hash >> (64 - p)) as usize;
        // sentinel bit caps rank at `64 - P + 1` when all remaining bits are zero
        let rest = (hash & ((1 << (64 - p)) - 1)) | (1 << (64 - p));
        let rank = rest.trailing_zeros() + 1;
        (idx, rank)
    }

    /// Return cardinality estimate
    #[inline]
    pub fn estimate(&self) -> f64 {
        let m = self.registers.len() as f64;
        let (sum, zeros) = self
            .registers
            .iter()
            .fold((0.0f64, 0u32), |(sum, zeros), rank| {
                (
                    sum + 1.0 / (1u64 << rank) as f64,
                    zeros + u32::from(rank == 0),
                )
            });

        let raw = alpha(self.registers.len()) * m * m / sum;

        if raw <= 2.5 * m {
            if zeros > 0 {
                return linear_counting(m, f64::from(zeros));
            }
            return raw;
        }

        if raw > HASH_SPACE / 30.0 && raw < HASH_SPACE {
            return -HASH_SPACE * (1.0 - raw / HASH_SPACE).ln();
        }

        raw
    }

    /// Return cardinality estimate rounded to the nearest integer
    #[inline]
    pub fn count(&self) -> usize {
        (self.estimate() + 0.5) as usize
    }

    /// Merge `rhs` into `self`, so that `self` estimates cardinality of the union of both streams.
    ///
    /// Fails with `Error::PrecisionMismatch` leaving both estimators unmodified
    /// when precisions differ. `rhs` is never modified.
    #[inline]
    pub fn merge(&mut self, rhs: &Self) -> Result<()> {
        if self.precision != rhs.precision {
            tracing::debug!(
                lhs = self.precision,
                rhs = rhs.precision,
                "rejected merge of estimators with different precision"
            );
            return Err(Error::PrecisionMismatch {
                lhs: self.precision,
                rhs: rhs.precision,
            });
        }
        self.registers.merge(&rhs.registers);
        Ok(())
    }

    /// Return whether no items were inserted since construction or last `clear`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|r| r == 0)
    }

    /// Reset all registers, keeping precision
    #[inline]
    pub fn clear(&mut self) {
        self.registers.clear();
    }

    /// Return memory size of `CardinalityEstimator`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + self.registers.heap_size()
    }
}

impl<H: Hasher + Default> Default for CardinalityEstimator<H> {
    fn default() -> Self {
        Self::from_registers(DEFAULT_PRECISION, Registers::new(1 << DEFAULT_PRECISION))
    }
}

impl<H: Hasher + Default> Clone for CardinalityEstimator<H> {
    /// Clone `CardinalityEstimator`
    fn clone(&self) -> Self {
        Self::from_registers(self.precision, self.registers.clone())
    }
}

impl<H: Hasher + Default> PartialEq for CardinalityEstimator<H> {
    /// Compare cardinality estimators
    fn eq(&self, rhs: &Self) -> bool {
        self.precision == rhs.precision && self.registers == rhs.registers
    }
}

impl<H: Hasher + Default> Eq for CardinalityEstimator<H> {}

impl<H: Hasher + Default> Debug for CardinalityEstimator<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {}, size: {} }}",
            self.precision,
            self.count(),
            self.size_of()
        )
    }
}

/// Maximum register rank for given precision
#[inline]
pub(crate) fn max_rank(precision: u8) -> u8 {
    64 - precision + 1
}

/// Parameter for bias correction
#[inline]
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Linear counting estimate based on number of empty registers
#[inline]
fn linear_counting(m: f64, zeros: f64) -> f64 {
    m * (m / zeros).ln()
}
