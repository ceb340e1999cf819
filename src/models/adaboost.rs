//! AdaBoost classifier (SAMME over decision stumps)

use crate::error::{EvalError, Result};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};

/// One-feature, one-threshold weak learner. Each side predicts the
/// weighted-majority class of the training samples falling on it.
#[derive(Debug, Clone)]
struct Stump {
    feature_idx: usize,
    threshold: f64,
    left_label: f64,
    right_label: f64,
}

impl Stump {
    fn predict_sample(&self, sample: &[f64]) -> f64 {
        if sample[self.feature_idx] <= self.threshold {
            self.left_label
        } else {
            self.right_label
        }
    }
}

/// SAMME AdaBoost, multi-class capable.
#[derive(Debug, Clone)]
pub struct AdaBoost {
    pub n_estimators: usize,
    pub learning_rate: f64,
    stumps: Vec<Stump>,
    alphas: Vec<f64>,
    classes: Vec<f64>,
}

impl AdaBoost {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            learning_rate: 1.0,
            stumps: Vec::new(),
            alphas: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Weighted-majority label among `rows`.
    fn weighted_majority(y: &Array1<f64>, weights: &Array1<f64>, rows: &[usize], classes: &[f64]) -> f64 {
        classes
            .iter()
            .map(|&c| {
                let mass: f64 = rows
                    .iter()
                    .filter(|&&i| (y[i] - c).abs() < 0.5)
                    .map(|&i| weights[i])
                    .sum();
                (c, mass)
            })
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, _)| c)
            .unwrap_or(0.0)
    }

    /// Best stump under the current sample weights.
    fn fit_stump(x: &Array2<f64>, y: &Array1<f64>, weights: &Array1<f64>, classes: &[f64]) -> Stump {
        let n_samples = x.nrows();
        let mut best_stump = Stump {
            feature_idx: 0,
            threshold: 0.0,
            left_label: classes[0],
            right_label: classes.last().copied().unwrap_or(classes[0]),
        };
        let mut best_error = f64::MAX;

        for f in 0..x.ncols() {
            let mut values: Vec<f64> = x.column(f).to_vec();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for w in values.windows(2) {
                let threshold = (w[0] + w[1]) / 2.0;
                let (mut left, mut right) = (Vec::new(), Vec::new());
                for i in 0..n_samples {
                    if x[[i, f]] <= threshold {
                        left.push(i);
                    } else {
                        right.push(i);
                    }
                }
                let left_label = Self::weighted_majority(y, weights, &left, classes);
                let right_label = Self::weighted_majority(y, weights, &right, classes);

                let error: f64 = (0..n_samples)
                    .filter(|&i| {
                        let pred = if x[[i, f]] <= threshold {
                            left_label
                        } else {
                            right_label
                        };
                        (pred - y[i]).abs() > 0.5
                    })
                    .map(|i| weights[i])
                    .sum();

                if error < best_error {
                    best_error = error;
                    best_stump = Stump {
                        feature_idx: f,
                        threshold,
                        left_label,
                        right_label,
                    };
                }
            }
        }
        best_stump
    }
}

impl Classifier for AdaBoost {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }
        self.classes = unique_classes(y);
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(EvalError::TrainingError(
                "AdaBoost needs at least 2 classes".to_string(),
            ));
        }

        self.stumps.clear();
        self.alphas.clear();
        let mut weights = Array1::from_elem(n_samples, 1.0 / n_samples as f64);

        for _ in 0..self.n_estimators {
            let stump = Self::fit_stump(x, y, &weights, &self.classes);

            let error: f64 = (0..n_samples)
                .filter(|&i| {
                    let sample: Vec<f64> = x.row(i).iter().copied().collect();
                    (stump.predict_sample(&sample) - y[i]).abs() > 0.5
                })
                .map(|i| weights[i])
                .sum();

            // SAMME: stop when the stump is no better than chance
            let chance = 1.0 - 1.0 / n_classes as f64;
            if error >= chance {
                break;
            }
            let error = error.max(1e-10);
            let alpha = self.learning_rate
                * (((1.0 - error) / error).ln() + (n_classes as f64 - 1.0).ln());

            for i in 0..n_samples {
                let sample: Vec<f64> = x.row(i).iter().copied().collect();
                if (stump.predict_sample(&sample) - y[i]).abs() > 0.5 {
                    weights[i] *= alpha.exp();
                }
            }
            let total = weights.sum();
            weights.mapv_inplace(|w| w / total);

            self.stumps.push(stump);
            self.alphas.push(alpha);

            if error <= 1e-10 {
                break;
            }
        }

        if self.stumps.is_empty() {
            // Degenerate data: fall back to a single best-effort stump
            let stump = Self::fit_stump(x, y, &weights, &self.classes);
            self.stumps.push(stump);
            self.alphas.push(1.0);
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.stumps.is_empty() {
            return Err(EvalError::TrainingError("model not fitted".to_string()));
        }
        let predictions: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();
                let mut scores = vec![0.0; self.classes.len()];
                for (stump, &alpha) in self.stumps.iter().zip(self.alphas.iter()) {
                    let pred = stump.predict_sample(&sample);
                    if let Some(pos) =
                        self.classes.iter().position(|&c| (c - pred).abs() < 0.5)
                    {
                        scores[pos] += alpha;
                    }
                }
                let best = scores
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                    })
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
    use ndarray::array;

    #[test]
    fn test_boosts_past_single_stump() {
        // XOR-ish layout a single stump cannot solve
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [1.0, 1.0],
            [1.1, 0.9],
            [0.0, 1.0],
            [0.1, 0.9],
            [1.0, 0.0],
            [0.9, 0.1],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = AdaBoost::new(40);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let correct = pred
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(correct >= 7, "boosting should nearly fit XOR: {correct}/8");
    }

    #[test]
    fn test_simple_threshold_data() {
        let x = array![[1.0], [2.0], [3.0], [8.0], [9.0], [10.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut model = AdaBoost::new(10);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }
}
