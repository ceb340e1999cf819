//! Classifier panel
//!
//! The benchmark evaluates a fixed, ordered panel of eight classifier
//! variants. Panel order is significant: it drives report column order and
//! chart legend order, and never changes for the lifetime of the process.
//! The orchestrator only ever sees the [`Classifier`] trait; everything
//! behind it is an opaque capability.

pub mod adaboost;
pub mod decision_tree;
pub mod extra_trees;
pub mod knn;
pub mod logistic;
pub mod naive_bayes;
pub mod random_forest;
pub mod svm;

pub use adaboost::AdaBoost;
pub use decision_tree::{DecisionTree, SplitMode, TreeParams};
pub use extra_trees::ExtraTrees;
pub use knn::KnnClassifier;
pub use logistic::LogisticRegression;
pub use naive_bayes::GaussianNaiveBayes;
pub use random_forest::RandomForest;
pub use svm::LinearSvm;

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Trait for panel classifiers.
pub trait Classifier: Send {
    /// Fit on an instances-by-features matrix and nominal labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict nominal labels.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// The fixed panel of model variants, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Logistic,
    NaiveBayes,
    Knn,
    DecisionTree,
    RandomForest,
    ExtraTrees,
    AdaBoost,
    LinearSvm,
}

impl ModelKind {
    /// Panel order. Report columns and chart legends follow this exactly.
    pub const PANEL: [ModelKind; 8] = [
        ModelKind::Logistic,
        ModelKind::NaiveBayes,
        ModelKind::Knn,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::ExtraTrees,
        ModelKind::AdaBoost,
        ModelKind::LinearSvm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Logistic => "Logistic",
            ModelKind::NaiveBayes => "NaiveBayes",
            ModelKind::Knn => "KNN",
            ModelKind::DecisionTree => "DecisionTree",
            ModelKind::RandomForest => "RandomForest",
            ModelKind::ExtraTrees => "ExtraTrees",
            ModelKind::AdaBoost => "AdaBoost",
            ModelKind::LinearSvm => "LinearSVM",
        }
    }

    /// Build a fresh, unfitted classifier. Stochastic models derive all
    /// randomness from `seed`.
    pub fn build(self, seed: u64) -> Box<dyn Classifier> {
        match self {
            ModelKind::Logistic => Box::new(LogisticRegression::new()),
            ModelKind::NaiveBayes => Box::new(GaussianNaiveBayes::new()),
            ModelKind::Knn => Box::new(KnnClassifier::with_k(5)),
            ModelKind::DecisionTree => {
                Box::new(DecisionTree::new(TreeParams::default()).with_seed(seed))
            }
            ModelKind::RandomForest => Box::new(RandomForest::new(50).with_seed(seed)),
            ModelKind::ExtraTrees => Box::new(ExtraTrees::new(50).with_seed(seed)),
            ModelKind::AdaBoost => Box::new(AdaBoost::new(30)),
            ModelKind::LinearSvm => Box::new(LinearSvm::new().with_seed(seed)),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sorted distinct class labels of a target vector.
pub(crate) fn unique_classes(y: &Array1<f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = y.to_vec();
    classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    classes.dedup();
    classes
}
