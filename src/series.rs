//! Per-partition accuracy series for charting
//!
//! One series per panel model, scoped to a single partition. Points are
//! (feature-strategy ordinal, accuracy) in ascending ordinal order, which
//! holds by construction because rows complete in strategy order. A model
//! that never completed a row keeps an empty series; downstream chart
//! export treats that as "no data" rather than an error.

use serde::Serialize;

use crate::models::ModelKind;
use crate::partition::Event;
use crate::selection::FeatureStrategy;

/// One charted line: a model's accuracy across feature strategies.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSeries {
    pub model: &'static str,
    /// (strategy ordinal, accuracy percentage) in ascending ordinal order
    pub points: Vec<(u8, f64)>,
}

impl ResultSeries {
    fn new(model: ModelKind) -> Self {
        Self {
            model: model.name(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Collects the panel's series for one partition.
#[derive(Debug)]
pub struct ResultSeriesBuilder {
    event: Event,
    series: Vec<ResultSeries>,
}

impl ResultSeriesBuilder {
    /// Creates one empty series per panel model, in panel order.
    pub fn new(event: Event) -> Self {
        Self {
            event,
            series: ModelKind::PANEL.iter().map(|&m| ResultSeries::new(m)).collect(),
        }
    }

    pub fn event(&self) -> Event {
        self.event
    }

    /// Appends a completed evaluation point for `model`.
    pub fn record(&mut self, model: ModelKind, strategy: FeatureStrategy, accuracy: f64) {
        let idx = ModelKind::PANEL
            .iter()
            .position(|&m| m == model)
            .unwrap_or_else(|| unreachable!("model {model:?} is not in the panel"));
        self.series[idx].points.push((strategy.ordinal(), accuracy));
    }

    /// Finishes the partition and yields the series in panel order.
    pub fn build(self) -> Vec<ResultSeries> {
        self.series
    }
}
