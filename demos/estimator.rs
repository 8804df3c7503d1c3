use cardinality_sketch::CardinalityEstimator;

fn main() -> Result<(), cardinality_sketch::Error> {
    let mut estimator1: CardinalityEstimator = CardinalityEstimator::new(12)?;
    for i in 0..10 {
        estimator1.insert_str(&format!("user-{}", i));
    }
    println!("estimator1 estimate = {:.2}", estimator1.estimate());

    let mut estimator2: CardinalityEstimator = CardinalityEstimator::new(12)?;
    for i in 5..15 {
        estimator2.insert_str(&format!("user-{}", i));
    }
    println!("estimator2 estimate = {:.2}", estimator2.estimate());

    // ship estimator2 as bytes, as if it was computed on another host
    let encoded = estimator2.to_bytes();
    let received: CardinalityEstimator = CardinalityEstimator::from_bytes(&encoded)?;

    estimator1.merge(&received)?;
    println!("merged estimate = {:.2}", estimator1.estimate());

    let other: CardinalityEstimator = CardinalityEstimator::new(10)?;
    if let Err(err) = estimator1.merge(&other) {
        println!("merge rejected: {}", err);
    }

    Ok(())
}
