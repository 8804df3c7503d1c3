#![no_main]

use cardinality_sketch::{CardinalityEstimator, FnvMixHasher};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = CardinalityEstimator::<FnvMixHasher>::from_bytes(data) {
        estimator.insert_bytes(data);
        assert!(estimator.estimate() > 0.0);
    }

    if let Ok(mut estimator) = serde_json::from_slice::<CardinalityEstimator>(data) {
        estimator.insert_bytes(data);
        assert!(estimator.estimate() > 0.0);
    }
});
