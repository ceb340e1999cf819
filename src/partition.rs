//! Event-based partition filtering
//!
//! The base dataset carries a nominal event attribute describing what
//! happened to each community between snapshots; the run evaluates every
//! model panel against each event partition independently.

use crate::dataset::Dataset;
use crate::error::{EvalError, Result};

/// The four community-evolution events, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Survive,
    Merge,
    Split,
    Dissolve,
}

impl Event {
    /// All events, ascending ordinal order. This order is part of the
    /// output contract.
    pub const ALL: [Event; 4] = [Event::Survive, Event::Merge, Event::Split, Event::Dissolve];

    /// Ordinal label used in the dataset's event attribute (1..4).
    pub fn ordinal(self) -> i64 {
        match self {
            Event::Survive => 1,
            Event::Merge => 2,
            Event::Split => 3,
            Event::Dissolve => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Event::Survive => "survive",
            Event::Merge => "merge",
            Event::Split => "split",
            Event::Dissolve => "dissolve",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Splits the base dataset into disjoint event partitions.
pub struct PartitionFilter {
    event_column: String,
}

impl PartitionFilter {
    pub fn new(event_column: &str) -> Self {
        Self {
            event_column: event_column.to_string(),
        }
    }

    /// Instances whose event attribute equals `event`, schema and instance
    /// order preserved. A missing event attribute is a fatal configuration
    /// error.
    pub fn partition(&self, dataset: &Dataset, event: Event) -> Result<Dataset> {
        let column = dataset.attribute_index(&self.event_column).ok_or_else(|| {
            EvalError::ConfigError(format!(
                "event attribute {:?} not present in dataset",
                self.event_column
            ))
        })?;
        dataset.filter_by_label(column, event.ordinal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn base() -> Dataset {
        let values = array![
            [1.0, 1.0, 0.0],
            [2.0, 2.0, 1.0],
            [3.0, 1.0, 1.0],
            [4.0, 4.0, 0.0],
            [5.0, 3.0, 1.0],
        ];
        Dataset::new(
            values,
            vec!["f".into(), "event".into(), "class".into()],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let ds = base();
        let filter = PartitionFilter::new("event");
        let total: usize = Event::ALL
            .iter()
            .map(|&e| filter.partition(&ds, e).unwrap().n_instances())
            .sum();
        assert_eq!(total, ds.n_instances());
    }

    #[test]
    fn test_partition_selects_matching_instances() {
        let ds = base();
        let filter = PartitionFilter::new("event");
        let survive = filter.partition(&ds, Event::Survive).unwrap();
        assert_eq!(survive.n_instances(), 2);
        assert_eq!(survive.feature_matrix().column(0).to_vec(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_missing_event_attribute_is_fatal_config_error() {
        let ds = base();
        let filter = PartitionFilter::new("nonexistent");
        let err = filter.partition(&ds, Event::Survive).unwrap_err();
        assert!(matches!(err, EvalError::ConfigError(_)));
        assert!(!err.is_row_recoverable());
    }

    #[test]
    fn test_event_order_fixed() {
        let ordinals: Vec<i64> = Event::ALL.iter().map(|e| e.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
    }
}
