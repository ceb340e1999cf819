//! Cross-validated model evaluation
//!
//! Stratified k-fold: instances are dealt into class-proportional folds,
//! each fold is held out once while the model trains on the rest, and the
//! reported accuracy is the percentage of correctly classified held-out
//! instances across all folds. Identical `(model, dataset, seed)` inputs
//! reproduce identical results.

use crate::dataset::Dataset;
use crate::error::{EvalError, Result};
use crate::models::ModelKind;
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Outcome of one cross-validated evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Percentage of correctly classified held-out instances
    pub accuracy: f64,
    /// Per-fold accuracy fractions
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    pub n_instances: usize,
    pub n_correct: usize,
}

impl Evaluation {
    fn from_folds(fold_scores: Vec<f64>, n_instances: usize, n_correct: usize) -> Self {
        let n_folds = fold_scores.len().max(1);
        let mean_score = fold_scores.iter().sum::<f64>() / n_folds as f64;
        let variance = fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / n_folds as f64;
        Self {
            accuracy: 100.0 * n_correct as f64 / n_instances.max(1) as f64,
            fold_scores,
            mean_score,
            std_score: variance.sqrt(),
            n_instances,
            n_correct,
        }
    }

    /// Human-readable cross-validation summary for the log stream.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Results\n========\n");
        out.push_str(&format!(
            "Correctly Classified Instances    {:>6}    {:.3} %\n",
            self.n_correct, self.accuracy
        ));
        out.push_str(&format!(
            "Incorrectly Classified Instances  {:>6}    {:.3} %\n",
            self.n_instances - self.n_correct,
            100.0 - self.accuracy
        ));
        out.push_str(&format!(
            "Total Number of Instances         {:>6}\n",
            self.n_instances
        ));
        out.push_str(&format!(
            "Fold accuracy                     {:.3} +/- {:.3}\n",
            self.mean_score, self.std_score
        ));
        out
    }
}

/// Stratified k-fold evaluator.
pub struct CrossValidationEvaluator {
    folds: usize,
    seed: u64,
}

impl CrossValidationEvaluator {
    pub fn new(folds: usize, seed: u64) -> Self {
        Self {
            folds: folds.max(2),
            seed,
        }
    }

    /// Class-proportional fold assignment. Indices are shuffled within each
    /// class under the evaluator seed, then dealt round-robin.
    fn stratified_folds(&self, labels: &Array1<i64>) -> Vec<Vec<usize>> {
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in labels.iter().enumerate() {
            class_indices.entry(label).or_default().push(i);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.folds];
        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);
            for (i, &idx) in indices.iter().enumerate() {
                folds[i % self.folds].push(idx);
            }
        }
        folds
    }

    /// Reject datasets that cannot form the requested stratified folds.
    /// This condition is fatal to the whole run, not just the current row.
    fn check_sufficiency(&self, dataset: &Dataset) -> Result<()> {
        let counts = dataset.class_counts();
        if counts.len() < 2 {
            let (&class, &count) = counts.iter().next().unwrap_or((&0, &0));
            return Err(EvalError::InsufficientTrainingData {
                class,
                count,
                folds: self.folds,
            });
        }
        for (&class, &count) in &counts {
            if count < self.folds {
                return Err(EvalError::InsufficientTrainingData {
                    class,
                    count,
                    folds: self.folds,
                });
            }
        }
        Ok(())
    }

    /// Train-and-evaluate one panel model against one prepared dataset.
    pub fn evaluate(&self, kind: ModelKind, dataset: &Dataset) -> Result<Evaluation> {
        self.check_sufficiency(dataset)?;

        let x = dataset.feature_matrix();
        let y = dataset.class_values();
        let labels = dataset.class_labels();
        let folds = self.stratified_folds(&labels);

        let mut fold_scores = Vec::with_capacity(self.folds);
        let mut n_correct = 0usize;

        for (fold_idx, test_rows) in folds.iter().enumerate() {
            let train_rows: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold_idx)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();

            let train_x = Self::take_rows(&x, &train_rows);
            let train_y: Array1<f64> = train_rows.iter().map(|&i| y[i]).collect();
            let test_x = Self::take_rows(&x, test_rows);
            let test_y: Array1<f64> = test_rows.iter().map(|&i| y[i]).collect();

            let mut model = kind.build(self.seed.wrapping_add(fold_idx as u64));
            model.fit(&train_x, &train_y)?;
            let predictions = model.predict(&test_x)?;

            let correct = predictions
                .iter()
                .zip(test_y.iter())
                .filter(|(p, t)| (*p - *t).abs() < 0.5)
                .count();
            n_correct += correct;
            fold_scores.push(correct as f64 / test_rows.len().max(1) as f64);
        }

        Ok(Evaluation::from_folds(
            fold_scores,
            dataset.n_instances(),
            n_correct,
        ))
    }

    fn take_rows(x: &Array2<f64>, rows: &[usize]) -> Array2<f64> {
        Array2::from_shape_fn((rows.len(), x.ncols()), |(i, j)| x[[rows[i], j]])
    }
}
