//! Gaussian naive Bayes

use crate::error::{EvalError, Result};
use crate::models::Classifier;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Gaussian naive Bayes classifier for continuous features.
#[derive(Debug, Clone)]
pub struct GaussianNaiveBayes {
    means: BTreeMap<i64, Vec<f64>>,
    variances: BTreeMap<i64, Vec<f64>>,
    priors: BTreeMap<i64, f64>,
    classes: Vec<i64>,
    var_smoothing: f64,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            means: BTreeMap::new(),
            variances: BTreeMap::new(),
            priors: BTreeMap::new(),
            classes: Vec::new(),
            var_smoothing: 1e-9,
        }
    }

    pub fn with_var_smoothing(mut self, smoothing: f64) -> Self {
        self.var_smoothing = smoothing;
        self
    }

    fn log_likelihood(&self, sample: &[f64], class: i64) -> f64 {
        let means = &self.means[&class];
        let variances = &self.variances[&class];
        sample
            .iter()
            .zip(means.iter().zip(variances.iter()))
            .map(|(&v, (&mean, &var))| {
                -0.5 * ((2.0 * PI * var).ln() + (v - mean).powi(2) / var)
            })
            .sum()
    }
}

impl Classifier for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 {
            return Err(EvalError::TrainingError("empty training set".to_string()));
        }

        let mut class_rows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in y.iter().enumerate() {
            class_rows.entry(label.round() as i64).or_default().push(i);
        }
        self.classes = class_rows.keys().copied().collect();

        self.means.clear();
        self.variances.clear();
        self.priors.clear();

        for (&class, rows) in &class_rows {
            self.priors
                .insert(class, rows.len() as f64 / n_samples as f64);

            // Welford's single-pass mean/variance
            let mut means = vec![0.0; n_features];
            let mut m2 = vec![0.0; n_features];
            for (count, &idx) in rows.iter().enumerate() {
                let row = x.row(idx);
                for (j, &val) in row.iter().enumerate() {
                    let delta = val - means[j];
                    means[j] += delta / (count + 1) as f64;
                    m2[j] += delta * (val - means[j]);
                }
            }
            let variances: Vec<f64> = m2
                .iter()
                .map(|&m| m / rows.len() as f64 + self.var_smoothing)
                .collect();

            self.means.insert(class, means);
            self.variances.insert(class, variances);
        }

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.classes.is_empty() {
            return Err(EvalError::TrainingError("model not fitted".to_string()));
        }

        let predictions: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();
                let best = self
                    .classes
                    .iter()
                    .map(|&c| (c, self.priors[&c].ln() + self.log_likelihood(&sample, c)))
                    .max_by(|(_, a), (_, b)| {
                        a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(c, _)| c)
                    .unwrap_or(self.classes[0]);
                best as f64
            })
            .collect();
        Ok(predictions)
    }
}
