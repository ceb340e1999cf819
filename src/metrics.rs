//! Run-wide statistics over model-tuned feature selections
//!
//! Accumulates the shape of every dataset produced by the model-dependent
//! feature strategy, keyed by the consuming model, so the run can finish
//! with a summary of how aggressively the wrapper search pruned each model's
//! attribute space. Lives for the whole run, read once at the end, then
//! cleared.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::dataset::Dataset;
use crate::models::ModelKind;

#[derive(Debug, Clone, Copy, Default)]
struct ShapeStats {
    updates: usize,
    total_features: usize,
    total_instances: usize,
    min_features: usize,
    max_features: usize,
}

impl ShapeStats {
    fn record(&mut self, n_features: usize, n_instances: usize) {
        if self.updates == 0 {
            self.min_features = n_features;
            self.max_features = n_features;
        } else {
            self.min_features = self.min_features.min(n_features);
            self.max_features = self.max_features.max(n_features);
        }
        self.updates += 1;
        self.total_features += n_features;
        self.total_instances += n_instances;
    }

    fn mean_features(&self) -> f64 {
        if self.updates == 0 {
            0.0
        } else {
            self.total_features as f64 / self.updates as f64
        }
    }
}

/// Process-wide accumulator over model-tuned selection outcomes.
#[derive(Debug, Default)]
pub struct AggregateMetrics {
    per_model: BTreeMap<&'static str, ShapeStats>,
    total_updates: usize,
}

impl AggregateMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the shape of a dataset the wrapper search produced for `model`.
    pub fn update(&mut self, model: ModelKind, selected: &Dataset) {
        let n_features = selected.n_attributes().saturating_sub(1);
        self.per_model
            .entry(model.name())
            .or_default()
            .record(n_features, selected.n_instances());
        self.total_updates += 1;
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    pub fn is_empty(&self) -> bool {
        self.total_updates == 0
    }

    /// Human-readable end-of-run summary, one line per model in name order.
    pub fn summary(&self) -> String {
        let mut out = String::from("Model-tuned selection metrics\n");
        if self.per_model.is_empty() {
            out.push_str("  (no model-tuned rows completed)\n");
            return out;
        }
        for (name, stats) in &self.per_model {
            let _ = writeln!(
                out,
                "  {name}: {} selections, features mean {:.1} (min {}, max {}), {} instances total",
                stats.updates,
                stats.mean_features(),
                stats.min_features,
                stats.max_features,
                stats.total_instances
            );
        }
        out
    }

    /// Resets the accumulator for a fresh run.
    pub fn clear(&mut self) {
        self.per_model.clear();
        self.total_updates = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn toy_dataset(n_features: usize, n_instances: usize) -> Dataset {
        let cols = n_features + 1;
        let values = Array2::from_shape_fn((n_instances, cols), |(i, j)| {
            if j == n_features {
                (i % 2) as f64
            } else {
                i as f64 + j as f64
            }
        });
        let mut attrs: Vec<String> = (0..n_features).map(|j| format!("f{j}")).collect();
        attrs.push("class".into());
        Dataset::new(values, attrs, n_features).unwrap()
    }

    #[test]
    fn test_update_tracks_shape_per_model() {
        let mut metrics = AggregateMetrics::new();
        metrics.update(ModelKind::Knn, &toy_dataset(3, 10));
        metrics.update(ModelKind::Knn, &toy_dataset(5, 12));
        metrics.update(ModelKind::Logistic, &toy_dataset(2, 8));

        assert_eq!(metrics.total_updates(), 3);
        let summary = metrics.summary();
        assert!(summary.contains("KNN: 2 selections, features mean 4.0 (min 3, max 5)"));
        assert!(summary.contains("Logistic: 1 selections"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut metrics = AggregateMetrics::new();
        metrics.update(ModelKind::AdaBoost, &toy_dataset(4, 20));
        assert!(!metrics.is_empty());
        metrics.clear();
        assert!(metrics.is_empty());
        assert!(metrics.summary().contains("no model-tuned rows"));
    }
}
