//! Class-imbalance correction
//!
//! Two fixed stages, applied in order after feature selection: SMOTE
//! synthetic minority oversampling, then a spread subsample that caps the
//! majority class at a bounded ratio of the minority class. Both stages are
//! deterministic under the corrector seed; any failure abandons the whole
//! (partition, strategy) row.

use crate::dataset::Dataset;
use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Ordered distance for heap-based partial sort.
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

/// SMOTE oversampling followed by spread subsampling.
pub struct ImbalanceCorrector {
    k_neighbors: usize,
    /// Majority classes are capped at `spread` times the minority count
    spread: f64,
    seed: u64,
}

impl ImbalanceCorrector {
    pub fn new(k_neighbors: usize, spread: f64, seed: u64) -> Self {
        Self {
            k_neighbors: k_neighbors.max(1),
            spread: spread.max(1.0),
            seed,
        }
    }

    /// Apply both correction stages and rebuild the dataset with the same
    /// attribute schema (class attribute stays last).
    pub fn correct(&self, dataset: &Dataset) -> Result<Dataset> {
        let x = dataset.feature_matrix();
        let y = dataset.class_labels();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let (x, y) = self.oversample(&x, &y, &mut rng)?;
        let (x, y) = self.spread_subsample(&x, &y, &mut rng)?;

        Dataset::from_features(&x, &y, &dataset.feature_names(), dataset.class_name())
    }

    fn distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// k nearest same-class neighbors of `point`, self excluded.
    fn find_neighbors(point_idx: usize, samples: &[Vec<f64>], k: usize) -> Vec<usize> {
        let point = &samples[point_idx];
        let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);
        for (i, other) in samples.iter().enumerate() {
            if i == point_idx {
                continue;
            }
            let dist = Self::distance(point, other);
            if heap.len() < k {
                heap.push(DistIdx(dist, i));
            } else if let Some(&top) = heap.peek() {
                if DistIdx(dist, i) < top {
                    heap.pop();
                    heap.push(DistIdx(dist, i));
                }
            }
        }
        heap.into_iter().map(|DistIdx(_, i)| i).collect()
    }

    /// Stage 1: synthesize minority samples along segments to same-class
    /// neighbors until every class reaches the majority count.
    fn oversample(
        &self,
        x: &Array2<f64>,
        y: &Array1<i64>,
        rng: &mut ChaCha8Rng,
    ) -> Result<(Array2<f64>, Array1<i64>)> {
        let counts = class_counts(y);
        if counts.len() < 2 {
            return Err(EvalError::ResamplingError(
                "need at least 2 classes to oversample".to_string(),
            ));
        }
        let max_count = *counts.values().max().unwrap();
        let indices = class_indices(y);
        let n_features = x.ncols();

        let mut synthetic_x: Vec<Vec<f64>> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();

        for (&class, &count) in &counts {
            let n_to_generate = max_count - count;
            if n_to_generate == 0 {
                continue;
            }
            if count < 2 {
                return Err(EvalError::ResamplingError(format!(
                    "class {class} has {count} instances, too few to synthesize neighbors"
                )));
            }

            let class_idx = &indices[&class];
            let class_samples: Vec<Vec<f64>> = class_idx
                .iter()
                .map(|&i| x.row(i).iter().copied().collect())
                .collect();
            let k = self.k_neighbors.min(class_samples.len() - 1);

            for _ in 0..n_to_generate {
                let idx = rng.gen_range(0..class_samples.len());
                let neighbors = Self::find_neighbors(idx, &class_samples, k);
                let neighbor = &class_samples[neighbors[rng.gen_range(0..neighbors.len())]];
                let point = &class_samples[idx];

                let gap: f64 = rng.gen();
                let sample: Vec<f64> = point
                    .iter()
                    .zip(neighbor.iter())
                    .map(|(&p, &n)| p + gap * (n - p))
                    .collect();
                synthetic_x.push(sample);
                synthetic_y.push(class);
            }
        }

        let n_original = x.nrows();
        let n_total = n_original + synthetic_x.len();
        let result_x = Array2::from_shape_fn((n_total, n_features), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                synthetic_x[i - n_original][j]
            }
        });
        let mut all_y: Vec<i64> = y.iter().copied().collect();
        all_y.extend_from_slice(&synthetic_y);

        Ok((result_x, Array1::from_vec(all_y)))
    }

    /// Stage 2: cap every class at `spread` times the minority count,
    /// sampling without replacement and keeping instance order.
    fn spread_subsample(
        &self,
        x: &Array2<f64>,
        y: &Array1<i64>,
        rng: &mut ChaCha8Rng,
    ) -> Result<(Array2<f64>, Array1<i64>)> {
        let counts = class_counts(y);
        if counts.is_empty() {
            return Err(EvalError::ResamplingError("empty dataset".to_string()));
        }
        let min_count = *counts.values().min().unwrap();
        let cap = ((min_count as f64) * self.spread).floor() as usize;

        let indices = class_indices(y);
        let mut selected: Vec<usize> = Vec::new();
        for class_idx in indices.values() {
            if class_idx.len() <= cap {
                selected.extend_from_slice(class_idx);
            } else {
                let mut shuffled = class_idx.clone();
                shuffled.shuffle(rng);
                selected.extend(shuffled.into_iter().take(cap));
            }
        }
        selected.sort_unstable();

        let result_x = Array2::from_shape_fn((selected.len(), x.ncols()), |(i, j)| {
            x[[selected[i], j]]
        });
        let result_y: Array1<i64> = selected.iter().map(|&i| y[i]).collect();
        Ok((result_x, result_y))
    }
}

fn class_counts(y: &Array1<i64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

fn class_indices(y: &Array1<i64>) -> BTreeMap<i64, Vec<usize>> {
    let mut indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        indices.entry(label).or_default().push(i);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imbalanced_dataset(majority: usize, minority: usize) -> Dataset {
        let n = majority + minority;
        let mut values = Vec::new();
        for i in 0..majority {
            values.push((i % 5) as f64);
            values.push((i / 5) as f64);
            values.push(0.0);
        }
        for i in 0..minority {
            values.push(10.0 + (i % 3) as f64);
            values.push(10.0 + (i / 3) as f64);
            values.push(1.0);
        }
        Dataset::new(
            Array2::from_shape_vec((n, 3), values).unwrap(),
            vec!["f1".into(), "f2".into(), "class".into()],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_correct_balances_classes() {
        let ds = imbalanced_dataset(20, 5);
        let corrector = ImbalanceCorrector::new(3, 1.0, 42);
        let corrected = corrector.correct(&ds).unwrap();

        let counts = corrected.class_counts();
        assert_eq!(counts.get(&0), counts.get(&1));
        assert!(corrected.n_instances() >= ds.n_instances());
        assert_eq!(corrected.attributes(), ds.attributes());
        assert_eq!(corrected.class_index(), corrected.n_attributes() - 1);
    }

    #[test]
    fn test_correct_deterministic_under_seed() {
        let ds = imbalanced_dataset(20, 6);
        let corrector = ImbalanceCorrector::new(3, 1.0, 7);
        let a = corrector.correct(&ds).unwrap();
        let b = corrector.correct(&ds).unwrap();
        assert_eq!(a.n_instances(), b.n_instances());
        assert_eq!(a.class_labels(), b.class_labels());
        assert_eq!(a.feature_matrix(), b.feature_matrix());
    }

    #[test]
    fn test_single_minority_instance_fails() {
        let ds = imbalanced_dataset(20, 1);
        let corrector = ImbalanceCorrector::new(3, 1.0, 42);
        let err = corrector.correct(&ds).unwrap_err();
        assert!(matches!(err, EvalError::ResamplingError(_)));
        assert!(err.is_row_recoverable());
    }

    #[test]
    fn test_single_class_fails() {
        let ds = imbalanced_dataset(10, 0);
        let corrector = ImbalanceCorrector::new(3, 1.0, 42);
        assert!(corrector.correct(&ds).is_err());
    }

    #[test]
    fn test_spread_bounds_majority() {
        // spread 2.0: majority may keep at most twice the minority count
        let ds = imbalanced_dataset(30, 5);
        // skip oversampling effects by checking the ratio after the fact
        let corrector = ImbalanceCorrector::new(3, 2.0, 42);
        let corrected = corrector.correct(&ds).unwrap();
        let counts = corrected.class_counts();
        let min = *counts.values().min().unwrap();
        let max = *counts.values().max().unwrap();
        assert!(max as f64 <= min as f64 * 2.0 + 1e-9);
    }
}
