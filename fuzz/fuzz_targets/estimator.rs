#![no_main]

use cardinality_sketch::CardinalityEstimator;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);
    let precision = 4 + data[0] % 15;

    let mut estimator1: CardinalityEstimator = CardinalityEstimator::new(precision).unwrap();
    for chunk in first_half.chunks(4) {
        estimator1.insert_bytes(chunk);
        assert!(estimator1.estimate() > 0.0);
        assert!(estimator1.registers().all(|r| r <= estimator1.max_rank()));
    }

    let mut estimator2: CardinalityEstimator = CardinalityEstimator::new(precision).unwrap();
    for chunk in second_half.chunks(4) {
        estimator2.insert_bytes(chunk);
        assert!(estimator2.estimate() > 0.0);
    }

    let registers_before: Vec<u8> = estimator1.registers().collect();
    estimator1.merge(&estimator2).unwrap();
    assert!(estimator1.registers().zip(registers_before).all(|(r, b)| r >= b));

    let decoded = CardinalityEstimator::from_bytes(&estimator1.to_bytes()).unwrap();
    assert_eq!(estimator1, decoded);
});
