//! Extremely randomized trees
//!
//! Like the random forest but each tree trains on the full sample (no
//! bootstrap) and split thresholds are drawn at random instead of searched.

use crate::error::{EvalError, Result};
use crate::models::decision_tree::{DecisionTree, SplitMode, TreeParams};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct ExtraTrees {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    seed: u64,
    trees: Vec<DecisionTree>,
    classes: Vec<f64>,
}

impl ExtraTrees {
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
}

impl Classifier for ExtraTrees {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }
        self.classes = unique_classes(y);
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: 2,
            max_features: Some((x.ncols() as f64).sqrt().ceil() as usize),
            split: SplitMode::Random,
        };
        let base_seed = self.seed;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let tree_seed = base_seed
                    .wrapping_mul(0x2545_f491_4f6c_dd1d)
                    .wrapping_add(t as u64);
                let mut tree = DecisionTree::new(params.clone()).with_seed(tree_seed);
                tree.fit(x, y)?;
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

        let predictions: Array1<f64> = (0..x.nrows())
            .map(|i| {
                let mut votes = vec![0usize; self.classes.len()];
                for preds in &per_tree {
                    if let Some(pos) = self
                        .classes
                        .iter()
                        .position(|&c| (c - preds[i]).abs() < 0.5)
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
            })
            .collect();
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn test_extra_trees_separates_clusters() {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for i in 0..12 {
            data.push((i % 4) as f64 * 0.2);
            data.push((i / 4) as f64 * 0.2);
            labels.push(0.0);
        }
        for i in 0..12 {
            data.push(6.0 + (i % 4) as f64 * 0.2);
            data.push(6.0 + (i / 4) as f64 * 0.2);
            labels.push(1.0);
        }
        let x = Array2::from_shape_vec((24, 2), data).unwrap();
        let y = Array1::from_vec(labels);

        let mut model = ExtraTrees::new(20).with_seed(3);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[0.3, 0.3], [6.3, 6.3]]).unwrap();
        assert_eq!(pred, array![0.0, 1.0]);
    }
}
