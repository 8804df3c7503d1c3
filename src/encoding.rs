//! ## Binary encoding
//! Compact byte encoding of estimator state used to ship estimators between processes
//! and merge them on the other side.
//!
//! Layout:
//! - bytes[0]      - precision `P`
//! - bytes[1..]    - `2^P` register ranks, one byte per register in index order
//!
//! The hasher type is not encoded: both sides must agree on it for merged results to be meaningful.

use std::hash::Hasher;

use crate::error::{DecodeError, Error, Result};
use crate::estimator::{max_rank, CardinalityEstimator, MAX_PRECISION, MIN_PRECISION};
use crate::registers::Registers;

impl<H: Hasher + Default> CardinalityEstimator<H> {
    /// Encode precision and registers into bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.num_registers());
        bytes.push(self.precision());
        bytes.extend(self.registers());
        bytes
    }

    /// Decode estimator previously encoded with `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.split_first() {
            Some((&precision, ranks)) => Self::from_parts(precision, ranks),
            None => {
                tracing::debug!(err = %DecodeError::Empty, "failed to decode estimator");
                Err(DecodeError::Empty.into())
            }
        }
    }

    /// Build estimator from precision and one rank per register, validating both
    pub(crate) fn from_parts(precision: u8, ranks: &[u8]) -> Result<Self> {
        Self::validate_parts(precision, ranks).inspect_err(|err| {
            tracing::debug!(precision, len = ranks.len(), %err, "failed to decode estimator");
        })
    }

    #[inline]
    fn validate_parts(precision: u8, ranks: &[u8]) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }

        let expected = 1usize << precision;
        if ranks.len() != expected {
            return Err(DecodeError::LengthMismatch {
                expected,
                got: ranks.len(),
            }
            .into());
        }

        let max = max_rank(precision);
        let mut registers = Registers::new(expected);
        for (index, &rank) in ranks.iter().enumerate() {
            if rank > max {
                return Err(DecodeError::RegisterOutOfRange { index, rank, max }.into());
            }
            registers.set(index, u32::from(rank));
        }

        Ok(Self::from_registers(precision, registers))
    }
}

impl<H: Hasher + Default> TryFrom<&[u8]> for CardinalityEstimator<H> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::hash::FnvMixHasher;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use test_case::test_case;

    type Estimator = CardinalityEstimator<FnvMixHasher>;

    /// Writer appending formatted log lines into a shared buffer
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a debug level subscriber installed and return everything it logged
    pub(crate) fn capture_logs(f: impl FnOnce()) -> String {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || LogBuffer(writer.clone()))
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let logs = buf.lock().unwrap().clone();
        String::from_utf8(logs).unwrap()
    }

    #[test_case(4, 0; "p = 4 empty")]
    #[test_case(4, 1000; "p = 4 saturated")]
    #[test_case(8, 10; "p = 8 sparse")]
    #[test_case(12, 100; "p = 12 hundred elements")]
    #[test_case(12, 10_000; "p = 12 ten thousand elements")]
    #[test_case(18, 10_000; "p = 18 ten thousand elements")]
    fn test_round_trip(precision: u8, n: usize) {
        let mut original = Estimator::new(precision).unwrap();
        for i in 0..n {
            original.insert_str(&format!("item{}", i));
        }

        let bytes = original.to_bytes();
        assert_eq!(bytes.len(), 1 + (1 << precision));
        assert_eq!(bytes[0], precision);

        let decoded = Estimator::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.estimate(), original.estimate());
    }

    #[test]
    fn test_decoded_estimators_merge() {
        let mut lhs = Estimator::new(10).unwrap();
        let mut rhs = Estimator::new(10).unwrap();
        for i in 0..5000 {
            lhs.insert(&i);
            rhs.insert(&(i + 2500));
        }

        let mut decoded = Estimator::try_from(lhs.to_bytes().as_slice()).unwrap();
        decoded
            .merge(&Estimator::try_from(rhs.to_bytes().as_slice()).unwrap())
            .unwrap();
        lhs.merge(&rhs).unwrap();

        assert_eq!(decoded, lhs);
    }

    #[test]
    fn test_max_rank_round_trip() {
        let mut e = Estimator::new(4).unwrap();
        e.insert_hash(0);
        let bytes = e.to_bytes();
        assert_eq!(bytes[1], 61);
        assert_eq!(Estimator::from_bytes(&bytes).unwrap(), e);
    }

    #[test_case(&[] => Err(Error::Decode(DecodeError::Empty)); "empty")]
    #[test_case(&[3] => Err(Error::InvalidPrecision(3)); "precision too small")]
    #[test_case(&[19, 0, 0] => Err(Error::InvalidPrecision(19)); "precision too large")]
    #[test_case(&[4] => Err(Error::Decode(DecodeError::LengthMismatch { expected: 16, got: 0 })); "missing registers")]
    #[test_case(&[4, 0, 0, 0] => Err(Error::Decode(DecodeError::LengthMismatch { expected: 16, got: 3 })); "truncated registers")]
    #[test_case(&[4; 18] => Err(Error::Decode(DecodeError::LengthMismatch { expected: 16, got: 17 })); "trailing bytes")]
    fn test_decode_malformed(bytes: &[u8]) -> Result<()> {
        Estimator::from_bytes(bytes).map(|_| ())
    }

    #[test]
    fn test_decode_register_out_of_range() {
        let mut bytes = vec![0u8; 17];
        bytes[0] = 4;
        bytes[6] = 62;
        assert_eq!(
            Estimator::from_bytes(&bytes),
            Err(Error::Decode(DecodeError::RegisterOutOfRange {
                index: 5,
                rank: 62,
                max: 61
            }))
        );
    }

    #[test_case(&[]; "empty")]
    #[test_case(&[19, 0, 0]; "invalid precision")]
    #[test_case(&[4, 0, 0, 0]; "truncated registers")]
    fn test_decode_failure_is_logged(bytes: &[u8]) {
        let logs = capture_logs(|| {
            assert!(Estimator::from_bytes(bytes).is_err());
        });
        assert!(logs.contains("failed to decode estimator"), "logs = {logs}");
    }

    #[test]
    fn test_decode_success_is_not_logged() {
        let bytes = Estimator::new(4).unwrap().to_bytes();
        let logs = capture_logs(|| {
            assert!(Estimator::from_bytes(&bytes).is_ok());
        });
        assert!(logs.is_empty(), "logs = {logs}");
    }
}
