//! Logistic regression
//!
//! L2-regularized logistic regression trained by batch gradient descent.
//! Multi-class targets are handled one-vs-rest with argmax over the class
//! scores.

use crate::error::{EvalError, Result};
use crate::models::{unique_classes, Classifier};
use ndarray::{Array1, Array2};

/// One-vs-rest logistic regression classifier.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Per-class weight vectors (class order matches `classes`)
    weights: Vec<Array1<f64>>,
    /// Per-class intercepts
    intercepts: Vec<f64>,
    classes: Vec<f64>,
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub learning_rate: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            weights: Vec::new(),
            intercepts: Vec::new(),
            classes: Vec::new(),
            alpha: 0.01,
            max_iter: 500,
            tol: 1e-6,
            learning_rate: 0.1,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.max(0.0);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Fit one binary weight vector for targets in {0, 1}.
    fn fit_binary(&self, x: &Array2<f64>, t: &Array1<f64>) -> (Array1<f64>, f64) {
        let n = x.nrows() as f64;
        let mut w = Array1::zeros(x.ncols());
        let mut b = 0.0;

        for _ in 0..self.max_iter {
            let scores = x.dot(&w) + b;
            let probs = scores.mapv(Self::sigmoid);
            let residual = &probs - t;

            let grad_w = x.t().dot(&residual) / n + self.alpha * &w;
            let grad_b = residual.sum() / n;

            let step = grad_w.mapv(f64::abs).sum() + grad_b.abs();
            w = w - self.learning_rate * &grad_w;
            b -= self.learning_rate * grad_b;

            if step < self.tol {
                break;
            }
        }

        (w, b)
    }

    fn decision_scores(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut scores = Array2::zeros((x.nrows(), self.classes.len()));
        for (c, (w, &b)) in self.weights.iter().zip(self.intercepts.iter()).enumerate() {
            let col = x.dot(w) + b;
            scores.column_mut(c).assign(&col);
        }
        scores
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }
        self.classes = unique_classes(y);
        if self.classes.len() < 2 {
            return Err(EvalError::TrainingError(
                "logistic regression needs at least 2 classes".to_string(),
            ));
        }

        self.weights.clear();
        self.intercepts.clear();
        for &class in &self.classes {
            let t: Array1<f64> = y.mapv(|v| if (v - class).abs() < 0.5 { 1.0 } else { 0.0 });
            let (w, b) = self.fit_binary(x, &t);
            self.weights.push(w);
            self.intercepts.push(b);
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.weights.is_empty() {
            return Err(EvalError::TrainingError("model not fitted".to_string()));
        }
        let scores = self.decision_scores(x);
        let predictions: Array1<f64> = scores
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
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
