//! Integration test: classifier panel behavior

use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use evoclass::prelude::*;

/// Two well-separated Gaussian blobs, `n` instances per class.
fn blobs(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(n * 2 * 3);
    let mut y = Vec::with_capacity(n * 2);
    for class in 0..2 {
        let center = class as f64 * 8.0;
        for _ in 0..n {
            x.push(center + rng.gen::<f64>());
            x.push(center + rng.gen::<f64>());
            x.push(rng.gen::<f64>());
            y.push(class as f64);
        }
    }
    (
        Array2::from_shape_vec((n * 2, 3), x).unwrap(),
        Array1::from_vec(y),
    )
}

fn blob_dataset(n: usize, seed: u64) -> Dataset {
    let (x, y) = blobs(n, seed);
    let labels = y.mapv(|v| v as i64);
    Dataset::from_features(
        &x,
        &labels,
        &["a".to_string(), "b".to_string(), "noise".to_string()],
        "class",
    )
    .unwrap()
}

#[test]
fn test_panel_order_is_fixed() {
    let names: Vec<&str> = ModelKind::PANEL.iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec![
            "Logistic",
            "NaiveBayes",
            "KNN",
            "DecisionTree",
            "RandomForest",
            "ExtraTrees",
            "AdaBoost",
            "LinearSVM",
        ]
    );
}

#[test]
fn test_every_panel_model_separates_blobs() {
    let (x, y) = blobs(20, 3);
    for kind in ModelKind::PANEL {
        let mut model = kind.build(1);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let correct = pred
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        let accuracy = correct as f64 / y.len() as f64;
        assert!(
            accuracy >= 0.9,
            "{} reached only {:.2} training accuracy on separable blobs",
            kind.name(),
            accuracy
        );
    }
}

#[test]
fn test_cross_validation_is_deterministic_per_model() {
    let ds = blob_dataset(15, 9);
    let evaluator = CrossValidationEvaluator::new(3, 1);
    for kind in ModelKind::PANEL {
        let a = evaluator.evaluate(kind, &ds).unwrap();
        let b = evaluator.evaluate(kind, &ds).unwrap();
        assert_eq!(a.accuracy, b.accuracy, "{} accuracy drifted", kind.name());
        assert_eq!(a.fold_scores, b.fold_scores);
    }
}

#[test]
fn test_cross_validation_accuracy_is_a_percentage() {
    let ds = blob_dataset(15, 4);
    let evaluation = CrossValidationEvaluator::new(3, 1)
        .evaluate(ModelKind::Knn, &ds)
        .unwrap();
    assert!(evaluation.accuracy > 50.0 && evaluation.accuracy <= 100.0);
    assert_eq!(evaluation.n_instances, 30);
    assert!(evaluation.summary().contains("Correctly Classified Instances"));
}

#[test]
fn test_too_few_instances_per_class_is_insufficient() {
    let ds = blob_dataset(4, 5);
    let err = CrossValidationEvaluator::new(10, 1)
        .evaluate(ModelKind::Logistic, &ds)
        .unwrap_err();
    assert!(matches!(err, EvalError::InsufficientTrainingData { .. }));
    assert!(!err.is_row_recoverable());
}
