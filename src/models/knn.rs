//! K-nearest neighbors classifier

use crate::error::{EvalError, Result};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Ordered distance for BinaryHeap-based partial sort.
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(Ordering::Equal)
            .then(self.1.cmp(&other.1))
    }
}

/// KNN classifier with uniform voting and Euclidean distance.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
    classes: Vec<f64>,
}

impl KnnClassifier {
    pub fn with_k(k: usize) -> Self {
        Self {
            n_neighbors: k.max(1),
            x_train: None,
            y_train: None,
            classes: Vec::new(),
        }
    }

    fn distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Indices of the k nearest training rows (heap partial sort).
    fn k_nearest(sample: &[f64], x_train: &Array2<f64>, k: usize) -> Vec<usize> {
        let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);
        for (i, row) in x_train.rows().into_iter().enumerate() {
            let row_slice: Vec<f64> = row.iter().copied().collect();
            let dist = Self::distance(sample, &row_slice);
            if heap.len() < k {
                heap.push(DistIdx(dist, i));
            } else if let Some(&DistIdx(max_dist, max_idx)) = heap.peek() {
                if DistIdx(dist, i) < DistIdx(max_dist, max_idx) {
                    heap.pop();
                    heap.push(DistIdx(dist, i));
                }
            }
        }
        heap.into_iter().map(|DistIdx(_, i)| i).collect()
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }
        self.classes = unique_classes(y);
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self
            .x_train
            .as_ref()
            .ok_or_else(|| EvalError::TrainingError("model not fitted".to_string()))?;
        let y_train = self.y_train.as_ref().expect("fitted with x_train");
        let k = self.n_neighbors.min(x_train.nrows());
        let classes = &self.classes;

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let sample: Vec<f64> = x.row(i).iter().copied().collect();
                let neighbors = Self::k_nearest(&sample, x_train, k);

                // Uniform vote; ties break toward the lowest class label
                let mut votes = vec![0usize; classes.len()];
                for &n in &neighbors {
                    if let Some(pos) = classes
                        .iter()
                        .position(|&c| (c - y_train[n]).abs() < 0.5)
                    {
                        votes[pos] += 1;
                    }
                }
                let best = votes
                    .iter()
                    .enumerate()
                    .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                classes[best]
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}
