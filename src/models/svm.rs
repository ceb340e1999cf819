//! Linear support vector machine
//!
//! Hinge-loss linear SVM trained with subgradient descent (Pegasos-style
//! step decay), one-vs-rest for multi-class targets. Epoch order is
//! shuffled with a seeded generator so the fit is reproducible.

use crate::error::{EvalError, Result};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct LinearSvm {
    pub c: f64,
    pub epochs: usize,
    seed: u64,
    weights: Vec<Array1<f64>>,
    intercepts: Vec<f64>,
    classes: Vec<f64>,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvm {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            epochs: 200,
            seed: 0,
            weights: Vec::new(),
            intercepts: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c.max(1e-6);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train one binary hyperplane for targets in {-1, +1}.
    fn fit_binary(&self, x: &Array2<f64>, t: &[f64], rng: &mut ChaCha8Rng) -> (Array1<f64>, f64) {
        let n_samples = x.nrows();
        let lambda = 1.0 / (self.c * n_samples as f64);
        let mut w: Array1<f64> = Array1::zeros(x.ncols());
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut step_count = 0usize;

        for _ in 0..self.epochs {
            order.shuffle(rng);
            for &i in &order {
                step_count += 1;
                let eta = 1.0 / (lambda * step_count as f64);
                let margin = t[i] * (x.row(i).dot(&w) + b);
                if margin < 1.0 {
                    let row = x.row(i);
                    for j in 0..w.len() {
                        w[j] = (1.0 - eta * lambda) * w[j] + eta * t[i] * row[j];
                    }
                    b += eta * t[i];
                } else {
                    w.mapv_inplace(|v| (1.0 - eta * lambda) * v);
                }
            }
        }
        (w, b)
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }
        self.classes = unique_classes(y);
        if self.classes.len() < 2 {
            return Err(EvalError::TrainingError(
                "SVM needs at least 2 classes".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.weights.clear();
        self.intercepts.clear();
        for &class in &self.classes {
            let t: Vec<f64> = y
                .iter()
                .map(|&v| if (v - class).abs() < 0.5 { 1.0 } else { -1.0 })
                .collect();
            let (w, b) = self.fit_binary(x, &t, &mut rng);
            self.weights.push(w);
            self.intercepts.push(b);
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.weights.is_empty() {
            return Err(EvalError::TrainingError("model not fitted".to_string()));
        }
        let predictions: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let best = self
                    .weights
                    .iter()
                    .zip(self.intercepts.iter())
                    .map(|(w, &b)| row.dot(w) + b)
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
    fn test_separates_margin() {
        let x = array![
            [-2.0, -2.1],
            [-2.2, -1.9],
            [-1.8, -2.0],
            [-2.1, -2.2],
            [2.0, 2.1],
            [2.2, 1.9],
            [1.8, 2.0],
            [2.1, 2.2],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = LinearSvm::new().with_seed(1);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_deterministic_under_seed() {
        let x = array![
            [0.0, 1.0],
            [1.0, 0.0],
            [0.5, 0.8],
            [5.0, 5.0],
            [4.5, 5.5],
            [5.5, 4.5]
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let test = array![[0.4, 0.4], [5.1, 5.1]];

        let mut a = LinearSvm::new().with_seed(9);
        let mut b = LinearSvm::new().with_seed(9);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&test).unwrap(), b.predict(&test).unwrap());
    }
}
