//! evoclass - Community evolution classification benchmark
//!
//! Evaluates a fixed panel of eight classifiers against a labeled community
//! dataset, comparing accuracy across four evolution-event partitions and
//! three feature-preparation strategies under stratified k-fold
//! cross-validation, and emits a comma-separated accuracy report plus one
//! accuracy-trend chart artifact per partition.
//!
//! # Modules
//!
//! ## Data
//! - [`dataset`] - In-memory labeled instance collection
//! - [`loader`] - CSV ingestion via polars
//! - [`partition`] - Event-label partition filter
//!
//! ## Preparation
//! - [`selection`] - The three feature-preparation strategies
//! - [`resample`] - Synthetic oversampling plus spread subsampling
//!
//! ## Evaluation
//! - [`models`] - The fixed classifier panel
//! - [`evaluation`] - Stratified cross-validation
//! - [`metrics`] - Run-wide selection statistics
//!
//! ## Output
//! - [`report`] - Appending accuracy report
//! - [`series`] / [`chart`] - Per-partition trend series and export
//!
//! ## Orchestration
//! - [`pipeline`] - The top-level evaluation grid

pub mod error;

pub mod config;
pub mod dataset;
pub mod loader;
pub mod partition;

pub mod resample;
pub mod selection;

pub mod evaluation;
pub mod metrics;
pub mod models;

pub mod chart;
pub mod report;
pub mod series;

pub mod pipeline;

pub use config::EvalConfig;
pub use dataset::Dataset;
pub use error::{EvalError, Result};
pub use pipeline::{Pipeline, RunSummary};

/// Commonly used types for downstream callers.
pub mod prelude {
    pub use crate::config::EvalConfig;
    pub use crate::dataset::Dataset;
    pub use crate::error::{EvalError, Result};
    pub use crate::evaluation::{CrossValidationEvaluator, Evaluation};
    pub use crate::loader::DatasetLoader;
    pub use crate::models::{Classifier, ModelKind};
    pub use crate::partition::{Event, PartitionFilter};
    pub use crate::pipeline::{Pipeline, RunSummary};
    pub use crate::resample::ImbalanceCorrector;
    pub use crate::selection::{FeatureSelector, FeatureStrategy};
}
