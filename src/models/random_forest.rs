//! Random forest classifier
//!
//! Bagged CART trees with per-split feature subsampling. Trees are trained
//! in parallel; each tree draws its bootstrap sample and split randomness
//! from a seed derived from the forest seed, so the fitted ensemble is
//! reproducible regardless of thread scheduling.

use crate::error::{EvalError, Result};
use crate::models::decision_tree::{DecisionTree, SplitMode, TreeParams};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    seed: u64,
    trees: Vec<DecisionTree>,
    classes: Vec<f64>,
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_depth: Some(12),
            seed: 0,
            trees: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn tree_params(&self, n_features: usize) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: 2,
            max_features: Some((n_features as f64).sqrt().ceil() as usize),
            split: SplitMode::Best,
        }
    }

    /// Majority vote across trees; ties break toward the lowest label.
    fn vote(&self, per_tree: &[Array1<f64>], sample_idx: usize) -> f64 {
        let mut votes = vec![0usize; self.classes.len()];
        for preds in per_tree {
            if let Some(pos) = self
                .classes
                .iter()
                .position(|&c| (c - preds[sample_idx]).abs() < 0.5)
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
        self.classes[best]
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }
        self.classes = unique_classes(y);
        let params = self.tree_params(x.ncols());
        let forest_seed = self.seed;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let tree_seed = forest_seed
                    .wrapping_mul(0x9e37_79b9_7f4a_7c15)
                    .wrapping_add(t as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);

                // Bootstrap sample
                let rows: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let boot_x = Array2::from_shape_fn((n_samples, x.ncols()), |(i, j)| {
                    x[[rows[i], j]]
                });
                let boot_y: Array1<f64> = rows.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTree::new(params.clone()).with_seed(tree_seed);
                tree.fit(&boot_x, &boot_y)?;
                Ok(tree)
            })
            .collect::<Result<Vec<DecisionTree>>>()?;

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(EvalError::TrainingError("model not fitted".to_string()));
        }
        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let predictions: Array1<f64> =
            (0..x.nrows()).map(|i| self.vote(&per_tree, i)).collect();
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clusters() -> (Array2<f64>, Array1<f64>) {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for i in 0..15 {
            data.push((i % 5) as f64 * 0.1);
            data.push((i / 5) as f64 * 0.1);
            labels.push(0.0);
        }
        for i in 0..15 {
            data.push(5.0 + (i % 5) as f64 * 0.1);
            data.push(5.0 + (i / 5) as f64 * 0.1);
            labels.push(1.0);
        }
        (
            Array2::from_shape_vec((30, 2), data).unwrap(),
            Array1::from_vec(labels),
        )
    }

    #[test]
    fn test_forest_separates_clusters() {
        let (x, y) = clusters();
        let mut forest = RandomForest::new(20).with_seed(42);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_forest_deterministic_under_seed() {
        let (x, y) = clusters();
        let test = array![[0.2, 0.2], [5.2, 5.2], [2.5, 2.5]];

        let mut a = RandomForest::new(10).with_seed(7);
        let mut b = RandomForest::new(10).with_seed(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&test).unwrap(), b.predict(&test).unwrap());
    }
}
