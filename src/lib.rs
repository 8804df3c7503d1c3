//! `cardinality-sketch` is a Rust crate designed to estimate the number of distinct elements in a stream or dataset.
//!
//! It implements a mergeable HyperLogLog sketch with `2^P` packed registers, a FNV-1a based
//! hash with an avalanche finalizer, and the classic estimator with linear counting for small
//! cardinalities. Estimators of equal precision can be merged, also across process boundaries
//! using the compact binary encoding.
//!
//! ```
//! use cardinality_sketch::CardinalityEstimator;
//!
//! let mut lhs: CardinalityEstimator = CardinalityEstimator::new(12)?;
//! let mut rhs: CardinalityEstimator = CardinalityEstimator::new(12)?;
//! lhs.insert_str("apple");
//! rhs.insert_str("banana");
//! rhs.insert_str("apple");
//!
//! lhs.merge(&rhs)?;
//! assert_eq!(lhs.count(), 2);
//! # Ok::<(), cardinality_sketch::Error>(())
//! ```
mod encoding;
pub mod error;
pub mod estimator;
pub mod hash;
mod registers;
#[cfg(feature = "with_serde")]
mod serde;

pub use error::{DecodeError, Error, Result};
pub use estimator::{CardinalityEstimator, DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
pub use hash::{hash_bytes, hash_str, FnvMixHasher};
