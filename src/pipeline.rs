//! Run orchestration
//!
//! Drives the full evaluation grid: for each event partition, for each
//! feature strategy, prepare a row dataset and cross-validate every panel
//! model against it. Row preparation failures skip the whole row and the
//! run continues; an insufficient-training-data failure during evaluation
//! aborts the run and surfaces to the caller, which owns exit behavior.
//!
//! Traversal order is part of the output contract: partitions ascend by
//! event ordinal, strategies ascend within a partition, models follow panel
//! order within a row.

use tracing::{debug, info, warn};

use crate::chart::ChartExporter;
use crate::config::EvalConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::evaluation::CrossValidationEvaluator;
use crate::metrics::AggregateMetrics;
use crate::models::ModelKind;
use crate::partition::{Event, PartitionFilter};
use crate::report::ReportWriter;
use crate::resample::ImbalanceCorrector;
use crate::selection::{FeatureSelector, FeatureStrategy};
use crate::series::ResultSeriesBuilder;

/// Outcome of preparing one (partition, strategy) row.
enum RowOutcome {
    Prepared(PreparedRow),
    Skipped(String),
}

/// Dataset(s) a prepared row hands to the model loop. The model-tuned
/// strategy yields one dataset per panel model; the others share one.
enum PreparedRow {
    Shared(Dataset),
    PerModel(Vec<Dataset>),
}

impl PreparedRow {
    fn for_model(&self, panel_idx: usize) -> &Dataset {
        match self {
            PreparedRow::Shared(ds) => ds,
            PreparedRow::PerModel(per) => &per[panel_idx],
        }
    }
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub rows_completed: usize,
    pub rows_skipped: usize,
    pub evaluations: usize,
    pub charts_written: usize,
    pub metrics_summary: String,
}

/// Top-level evaluation pipeline.
pub struct Pipeline {
    config: EvalConfig,
    filter: PartitionFilter,
    selector: FeatureSelector,
    corrector: ImbalanceCorrector,
    evaluator: CrossValidationEvaluator,
    metrics: AggregateMetrics,
}

impl Pipeline {
    pub fn new(config: EvalConfig) -> Self {
        let filter = PartitionFilter::new(&config.event_column);
        let selector = FeatureSelector::new(config.max_tuned_features);
        let corrector = ImbalanceCorrector::new(config.smote_neighbors, config.spread, config.seed);
        let evaluator = CrossValidationEvaluator::new(config.folds, config.seed);
        Self {
            config,
            filter,
            selector,
            corrector,
            evaluator,
            metrics: AggregateMetrics::new(),
        }
    }

    /// Runs the full grid against a loaded base dataset. Output streams are
    /// owned by this call and flushed on every exit path, including fatal
    /// evaluation failures.
    pub fn run(&mut self, base: &Dataset) -> Result<RunSummary> {
        let mut report = ReportWriter::open(self.config.report_path())?;
        let charts = ChartExporter::new(&self.config.out_dir);
        let mut summary = RunSummary::default();

        let panel: Vec<&str> = ModelKind::PANEL.iter().map(|m| m.name()).collect();
        info!(models = ?panel, folds = self.config.folds, seed = self.config.seed, "starting evaluation run");

        for event in Event::ALL {
            let partition = self.filter.partition(base, event)?;
            info!(event = %event, instances = partition.n_instances(), "processing partition");

            let mut series = ResultSeriesBuilder::new(event);
            report.write_header()?;

            for strategy in FeatureStrategy::ALL {
                let row = match self.prepare_row(&partition, strategy)? {
                    RowOutcome::Prepared(row) => row,
                    RowOutcome::Skipped(reason) => {
                        warn!(event = %event, strategy = strategy.name(), %reason, "skipping row");
                        summary.rows_skipped += 1;
                        continue;
                    }
                };

                let mut accuracies = Vec::with_capacity(ModelKind::PANEL.len());
                for (idx, model) in ModelKind::PANEL.into_iter().enumerate() {
                    let evaluation = self.evaluator.evaluate(model, row.for_model(idx))?;
                    debug!(event = %event, strategy = strategy.name(), model = model.name(), "\n{}", evaluation.summary());
                    accuracies.push(evaluation.accuracy);
                    summary.evaluations += 1;
                }

                // The row reaches the report and the series only once every
                // panel model has evaluated, so skips stay all-or-nothing.
                report.write_row(&accuracies)?;
                for (idx, model) in ModelKind::PANEL.into_iter().enumerate() {
                    series.record(model, strategy, accuracies[idx]);
                }
                if let PreparedRow::PerModel(per) = &row {
                    for (idx, model) in ModelKind::PANEL.into_iter().enumerate() {
                        self.metrics.update(model, &per[idx]);
                    }
                }
                summary.rows_completed += 1;
            }

            charts.export(event, &series.build())?;
            summary.charts_written += 1;
        }

        report.flush()?;
        summary.metrics_summary = self.metrics.summary();
        info!("{}", summary.metrics_summary);
        info!(
            rows_completed = summary.rows_completed,
            rows_skipped = summary.rows_skipped,
            evaluations = summary.evaluations,
            "run finished"
        );
        self.metrics.clear();
        Ok(summary)
    }

    /// Prepares one row: feature selection then imbalance correction, plus
    /// the per-model wrapper search for the model-tuned strategy. Returns
    /// `Skipped` for row-recoverable failures and propagates the rest.
    fn prepare_row(&self, partition: &Dataset, strategy: FeatureStrategy) -> Result<RowOutcome> {
        let selected = match strategy {
            FeatureStrategy::Baseline => self.selector.baseline(partition),
            FeatureStrategy::Extended | FeatureStrategy::ModelTuned => {
                self.selector.extended(partition)
            }
        };
        let selected = match selected {
            Ok(ds) => ds,
            Err(e) if e.is_row_recoverable() => return Ok(RowOutcome::Skipped(e.to_string())),
            Err(e) => return Err(e),
        };

        let corrected = match self.corrector.correct(&selected) {
            Ok(ds) => ds,
            Err(e) if e.is_row_recoverable() => return Ok(RowOutcome::Skipped(e.to_string())),
            Err(e) => return Err(e),
        };

        if !strategy.is_model_dependent() {
            return Ok(RowOutcome::Prepared(PreparedRow::Shared(corrected)));
        }

        // All eight searches must succeed before any model evaluates, so a
        // late search failure cannot leave a partially evaluated row.
        let mut per_model = Vec::with_capacity(ModelKind::PANEL.len());
        for model in ModelKind::PANEL {
            match self.selector.model_tuned(&corrected, model, self.config.seed) {
                Ok(ds) => per_model.push(ds),
                Err(e) if e.is_row_recoverable() => {
                    return Ok(RowOutcome::Skipped(format!(
                        "wrapper search failed for {}: {e}",
                        model.name()
                    )))
                }
                Err(e) => return Err(e),
            }
        }
        Ok(RowOutcome::Prepared(PreparedRow::PerModel(per_model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use ndarray::Array2;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // Base dataset covering all four events with two separable classes.
    fn grid_dataset(per_class: usize) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut rows = Vec::new();
        for event in 1..=4 {
            for class in 0..2 {
                for _ in 0..per_class {
                    let base = class as f64 * 5.0;
                    rows.push(vec![
                        base + rng.gen::<f64>(),
                        base + rng.gen::<f64>(),
                        rng.gen::<f64>(),
                        event as f64,
                        class as f64,
                    ]);
                }
            }
        }
        let n = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Dataset::new(
            Array2::from_shape_vec((n, 5), flat).unwrap(),
            vec![
                "comm_size".into(),
                "comm_density".into(),
                "leader_deg".into(),
                "event".into(),
                "class".into(),
            ],
            4,
        )
        .unwrap()
    }

    fn test_config(dir: &std::path::Path) -> EvalConfig {
        EvalConfig::new("event", "class")
            .with_folds(3)
            .with_seed(1)
            .with_smote_neighbors(2)
            .with_out_dir(dir)
    }

    #[test]
    fn test_full_grid_completes() {
        let dir = tempfile::tempdir().unwrap();
        let base = grid_dataset(8);
        let mut pipeline = Pipeline::new(test_config(dir.path()));
        let summary = pipeline.run(&base).unwrap();

        assert_eq!(summary.rows_completed, 12);
        assert_eq!(summary.rows_skipped, 0);
        assert_eq!(summary.evaluations, 96);
        assert_eq!(summary.charts_written, 4);
    }

    #[test]
    fn test_missing_event_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let base = grid_dataset(8);
        let config = EvalConfig::new("no_such_column", "class")
            .with_folds(3)
            .with_out_dir(dir.path());
        let err = Pipeline::new(config).run(&base).unwrap_err();
        assert!(matches!(err, EvalError::ConfigError(_)));
    }

    #[test]
    fn test_insufficient_data_propagates() {
        let dir = tempfile::tempdir().unwrap();
        // Two instances per class cannot form 10 stratified folds.
        let base = grid_dataset(2);
        let config = EvalConfig::new("event", "class")
            .with_folds(10)
            .with_out_dir(dir.path());
        let err = Pipeline::new(config).run(&base).unwrap_err();
        assert!(matches!(err, EvalError::InsufficientTrainingData { .. }));
    }
}
