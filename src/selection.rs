//! Feature-preparation strategies
//!
//! Three fixed recipes derive the attribute subset used for evaluation.
//! Strategies 1 and 2 are pure attribute-family projections shared by every
//! model; strategy 3 runs a wrapper search driven by the specific model
//! that will consume the result, so its output differs per model. Every
//! strategy leaves the class attribute pinned at the last position.

use crate::dataset::Dataset;
use crate::error::{EvalError, Result};
use crate::evaluation::CrossValidationEvaluator;
use crate::models::ModelKind;

/// Attribute-name prefixes of the three feature families.
const COMMUNITY_PREFIX: &str = "comm_";
const LEADERSHIP_PREFIX: &str = "leader_";
const TEMPORAL_PREFIX: &str = "temporal_";

/// The three feature-preparation recipes, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureStrategy {
    /// Community features only
    Baseline,
    /// Community + leadership + temporal features
    Extended,
    /// Wrapper attribute search driven by the consuming model
    ModelTuned,
}

impl FeatureStrategy {
    /// Ascending ordinal order; part of the output contract.
    pub const ALL: [FeatureStrategy; 3] = [
        FeatureStrategy::Baseline,
        FeatureStrategy::Extended,
        FeatureStrategy::ModelTuned,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            FeatureStrategy::Baseline => 1,
            FeatureStrategy::Extended => 2,
            FeatureStrategy::ModelTuned => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureStrategy::Baseline => "community",
            FeatureStrategy::Extended => "community+leadership+temporal",
            FeatureStrategy::ModelTuned => "model-tuned",
        }
    }

    /// Whether the prepared dataset depends on the consuming model.
    pub fn is_model_dependent(self) -> bool {
        matches!(self, FeatureStrategy::ModelTuned)
    }
}

/// Applies the feature-preparation recipes.
pub struct FeatureSelector {
    /// Cap on features kept by the wrapper search
    max_tuned_features: usize,
    /// Folds for the wrapper search's internal cross-validation
    search_folds: usize,
}

impl FeatureSelector {
    pub fn new(max_tuned_features: usize) -> Self {
        Self {
            max_tuned_features: max_tuned_features.max(1),
            search_folds: 3,
        }
    }

    fn family_attributes(dataset: &Dataset, prefixes: &[&str]) -> Vec<String> {
        dataset
            .feature_names()
            .into_iter()
            .filter(|name| prefixes.iter().any(|p| name.starts_with(p)))
            .collect()
    }

    /// Strategy 1: fixed community-feature subset.
    pub fn baseline(&self, dataset: &Dataset) -> Result<Dataset> {
        let attrs = Self::family_attributes(dataset, &[COMMUNITY_PREFIX]);
        if attrs.is_empty() {
            return Err(EvalError::SelectionError(
                "no community-family attributes present".to_string(),
            ));
        }
        dataset.project(&attrs)
    }

    /// Strategy 2: community + leadership + temporal families.
    pub fn extended(&self, dataset: &Dataset) -> Result<Dataset> {
        let attrs = Self::family_attributes(
            dataset,
            &[COMMUNITY_PREFIX, LEADERSHIP_PREFIX, TEMPORAL_PREFIX],
        );
        if attrs.is_empty() {
            return Err(EvalError::SelectionError(
                "no known feature-family attributes present".to_string(),
            ));
        }
        dataset.project(&attrs)
    }

    /// Strategy 3: greedy forward wrapper search scored by internal
    /// cross-validation with the consuming model. Deterministic under
    /// `seed`; ties break toward the lower feature index.
    pub fn model_tuned(&self, dataset: &Dataset, model: ModelKind, seed: u64) -> Result<Dataset> {
        let n_features = dataset.n_attributes().saturating_sub(1);
        if n_features == 0 {
            return Err(EvalError::SelectionError(
                "no candidate features for wrapper search".to_string(),
            ));
        }

        let evaluator = CrossValidationEvaluator::new(self.search_folds, seed);
        let score = |indices: &[usize]| -> Result<f64> {
            let candidate = dataset.project_feature_indices(indices)?;
            let result = evaluator.evaluate(model, &candidate).map_err(|e| {
                // Inside selection, an unevaluable candidate is a row-skip
                // condition, not a run-fatal one.
                EvalError::SelectionError(format!("wrapper search cannot score subset: {e}"))
            })?;
            Ok(result.accuracy)
        };

        let mut selected: Vec<usize> = Vec::new();
        let mut best_score = f64::NEG_INFINITY;

        while selected.len() < self.max_tuned_features.min(n_features) {
            let mut round_best: Option<(usize, f64)> = None;
            for f in 0..n_features {
                if selected.contains(&f) {
                    continue;
                }
                let mut trial = selected.clone();
                trial.push(f);
                trial.sort_unstable();
                let s = score(&trial)?;
                if round_best.map_or(true, |(_, rs)| s > rs) {
                    round_best = Some((f, s));
                }
            }

            match round_best {
                Some((f, s)) if selected.is_empty() || s > best_score + 1e-9 => {
                    selected.push(f);
                    selected.sort_unstable();
                    best_score = s;
                }
                _ => break,
            }
        }

        if selected.is_empty() {
            return Err(EvalError::SelectionError(
                "wrapper search selected no features".to_string(),
            ));
        }
        dataset.project_feature_indices(&selected)
    }
}
