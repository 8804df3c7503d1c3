use thiserror::Error;

/// Errors returned by `CardinalityEstimator` operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Precision outside of `[MIN_PRECISION, MAX_PRECISION]` range
    #[error("invalid precision {0}: expected value in [4, 18] range")]
    InvalidPrecision(u8),
    /// Merge attempted between estimators of different precision
    #[error("precision mismatch: cannot merge estimator with precision {rhs} into precision {lhs}")]
    PrecisionMismatch { lhs: u8, rhs: u8 },
    /// Malformed encoded estimator state
    #[error("failed to decode estimator: {0}")]
    Decode(#[from] DecodeError),
}

/// Reasons why encoded estimator state was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No bytes to decode
    #[error("empty input")]
    Empty,
    /// Number of registers doesn't match `2^precision`
    #[error("expected {expected} registers, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    /// Register rank exceeds `64 - precision + 1`
    #[error("register {index} has rank {rank} above maximum {max}")]
    RegisterOutOfRange { index: usize, rank: u8, max: u8 },
}

pub type Result<T> = std::result::Result<T, Error>;
