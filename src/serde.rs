//! # Serde module for CardinalityEstimator
//!
//! This module provides serde-based (serialization and deserialization) features for
//! `CardinalityEstimator`. It uses `serde`'s custom serialization and deserialization mechanisms.
//!
//! `CardinalityEstimator` is serialized as a tuple `(precision, registers)` where `registers`
//! holds one rank per register, the same content as the binary encoding produced by `to_bytes`.
//!
//! During deserialization the tuple is validated the same way as `from_bytes` does, so
//! invalid precision, wrong number of registers or out of range ranks are rejected.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use std::hash::Hasher;

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::estimator::CardinalityEstimator;

impl<H: Hasher + Default> Serialize for CardinalityEstimator<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let registers: Vec<u8> = self.registers().collect();
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.precision())?;
        tup.serialize_element(&registers)?;
        tup.end()
    }
}

impl<'de, H: Hasher + Default> Deserialize<'de> for CardinalityEstimator<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (precision, registers): (u8, Vec<u8>) = Deserialize::deserialize(deserializer)?;
        CardinalityEstimator::from_parts(precision, &registers).map_err(Error::custom)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::encoding::tests::capture_logs;
    use crate::hash::FnvMixHasher;
    use test_case::test_case;

    type Estimator = CardinalityEstimator<FnvMixHasher>;

    #[test_case(0; "empty set")]
    #[test_case(1; "single element")]
    #[test_case(2; "two distinct elements")]
    #[test_case(100; "hundred distinct elements")]
    #[test_case(10000; "ten thousand distinct elements")]
    fn test_serde(n: usize) {
        let mut original_estimator = Estimator::new(10).unwrap();

        for i in 0..n {
            let item = &format!("item{}", i);
            original_estimator.insert_str(item);
        }

        let serialized = serde_json::to_string(&original_estimator).expect("serialization failed");
        assert!(
            !serialized.is_empty(),
            "serialized string should not be empty"
        );

        let deserialized_estimator: Estimator =
            serde_json::from_str(&serialized).expect("deserialization failed");

        assert_eq!(original_estimator, deserialized_estimator);
    }

    #[test]
    fn test_serialized_layout() {
        let e = Estimator::new(4).unwrap();
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            "[4,[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]]"
        );
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let invalid_json = "{ invalid_json_string }";
        let result: Result<Estimator, _> = serde_json::from_str(invalid_json);

        assert!(
            result.is_err(),
            "Deserialization should fail for invalid JSON"
        );
    }

    #[test_case("[12345,null]"; "precision overflow")]
    #[test_case("[3,[0,0,0,0,0,0,0,0]]"; "precision too small")]
    #[test_case("[4,[0,0,0]]"; "too few registers")]
    #[test_case("[4,[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,62]]"; "rank out of range")]
    #[test_case("[4]"; "missing registers")]
    fn test_failed_deserialization(input: &str) {
        let result: Result<Estimator, _> = serde_json::from_str(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_deserialization_is_logged() {
        let logs = capture_logs(|| {
            let result: Result<Estimator, _> = serde_json::from_str("[4,[0,0,0]]");
            assert!(result.is_err());
        });
        assert!(logs.contains("failed to decode estimator"), "logs = {logs}");
        assert!(logs.contains("expected 16 registers, got 3"), "logs = {logs}");
    }
}
