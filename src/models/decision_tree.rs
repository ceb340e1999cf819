//! Decision tree classifier (CART, Gini impurity)
//!
//! Also serves as the base learner for the forest ensembles: `TreeParams`
//! controls depth, per-split feature subsampling and whether split
//! thresholds are searched exhaustively or drawn at random (extra-trees
//! style).

use crate::error::{EvalError, Result};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tree node
#[derive(Debug, Clone)]
pub enum TreeNode {
    Leaf {
        label: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// How split thresholds are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Exhaustive scan over midpoints of adjacent distinct values
    Best,
    /// One random threshold per candidate feature
    Random,
}

/// Tree growth parameters.
#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all
    pub max_features: Option<usize>,
    pub split: SplitMode,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: Some(12),
            min_samples_split: 2,
            max_features: None,
            split: SplitMode::Best,
        }
    }
}

/// CART classification tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    params: TreeParams,
    seed: u64,
    root: Option<TreeNode>,
    classes: Vec<f64>,
}

impl DecisionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            seed: 0,
            root: None,
            classes: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn gini(labels: &[f64], classes: &[f64]) -> f64 {
        let n = labels.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        let mut impurity = 1.0;
        for &class in classes {
            let count = labels.iter().filter(|&&l| (l - class).abs() < 0.5).count();
            let p = count as f64 / n;
            impurity -= p * p;
        }
        impurity
    }

    fn majority_label(labels: &[f64], classes: &[f64]) -> f64 {
        classes
            .iter()
            .map(|&c| {
                (
                    c,
                    labels.iter().filter(|&&l| (l - c).abs() < 0.5).count(),
                )
            })
            .max_by(|(ca, a), (cb, b)| {
                a.cmp(b)
                    .then(cb.partial_cmp(ca).unwrap_or(std::cmp::Ordering::Equal))
            })
            .map(|(c, _)| c)
            .unwrap_or(0.0)
    }

    /// Best (feature, threshold) by weighted Gini over the candidate
    /// features, or `None` if no split separates anything.
    fn find_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let mut features: Vec<usize> = (0..n_features).collect();
        if let Some(max) = self.params.max_features {
            if max < n_features {
                features.shuffle(rng);
                features.truncate(max);
                features.sort_unstable();
            }
        }

        let labels: Vec<f64> = rows.iter().map(|&i| y[i]).collect();
        let parent_impurity = Self::gini(&labels, &self.classes);
        let mut best: Option<(usize, f64, f64)> = None;

        for &f in &features {
            let mut values: Vec<f64> = rows.iter().map(|&i| x[[i, f]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();
            if values.len() < 2 {
                continue;
            }

            let thresholds: Vec<f64> = match self.params.split {
                SplitMode::Best => values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect(),
                SplitMode::Random => {
                    let lo = values[0];
                    let hi = values[values.len() - 1];
                    vec![rng.gen_range(lo..hi)]
                }
            };

            for threshold in thresholds {
                let (mut left, mut right) = (Vec::new(), Vec::new());
                for &i in rows {
                    if x[[i, f]] <= threshold {
                        left.push(y[i]);
                    } else {
                        right.push(y[i]);
                    }
                }
                if left.is_empty() || right.is_empty() {
                    continue;
                }
                let n = rows.len() as f64;
                let weighted = (left.len() as f64 / n) * Self::gini(&left, &self.classes)
                    + (right.len() as f64 / n) * Self::gini(&right, &self.classes);
                let gain = parent_impurity - weighted;
                if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((f, threshold, gain));
                }
            }
        }

        best.map(|(f, t, _)| (f, t))
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let labels: Vec<f64> = rows.iter().map(|&i| y[i]).collect();
        let leaf = TreeNode::Leaf {
            label: Self::majority_label(&labels, &self.classes),
        };

        if rows.len() < self.params.min_samples_split {
            return leaf;
        }
        if let Some(max_depth) = self.params.max_depth {
            if depth >= max_depth {
                return leaf;
            }
        }
        if Self::gini(&labels, &self.classes) <= 1e-12 {
            return leaf;
        }

        match self.find_split(x, y, rows, rng) {
            None => leaf,
            Some((feature_idx, threshold)) => {
                let (mut left_rows, mut right_rows) = (Vec::new(), Vec::new());
                for &i in rows {
                    if x[[i, feature_idx]] <= threshold {
                        left_rows.push(i);
                    } else {
                        right_rows.push(i);
                    }
                }
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left: Box::new(self.build(x, y, &left_rows, depth + 1, rng)),
                    right: Box::new(self.build(x, y, &right_rows, depth + 1, rng)),
                }
            }
        }
    }

    fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
        match node {
            TreeNode::Leaf { label } => *label,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }
        self.classes = unique_classes(y);
        let rows: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.root = Some(self.build(x, y, &rows, 0, &mut rng));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| EvalError::TrainingError("model not fitted".to_string()))?;
        let predictions: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();
                Self::predict_sample(root, &sample)
            })
            .collect();
        Ok(predictions)
    }
}
