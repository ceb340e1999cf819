//! Per-partition accuracy chart export
//!
//! Serializes one chart specification per partition as a JSON artifact:
//! x axis is the feature-strategy ordinal, y axis is accuracy, one line per
//! panel model in panel order. Rendering is left to external tooling; the
//! artifact carries everything a plotter needs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::partition::Event;
use crate::series::ResultSeries;

#[derive(Debug, Serialize)]
struct ChartSpec<'a> {
    title: String,
    x_label: &'static str,
    y_label: &'static str,
    /// Legend entries in panel order, including models with no data
    legend: Vec<&'static str>,
    series: &'a [ResultSeries],
}

/// Writes chart artifacts into an output directory.
pub struct ChartExporter {
    out_dir: PathBuf,
}

impl ChartExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Artifact path for one partition's chart.
    pub fn chart_path(&self, event: Event) -> PathBuf {
        self.out_dir
            .join(format!("chart_event{}_{}.json", event.ordinal(), event.name()))
    }

    /// Exports one partition's series as a chart artifact. Empty series are
    /// kept so the legend stays complete across partitions.
    pub fn export(&self, event: Event, series: &[ResultSeries]) -> Result<PathBuf> {
        let spec = ChartSpec {
            title: format!("Accuracy by feature strategy: {event}"),
            x_label: "feature strategy",
            y_label: "accuracy (%)",
            legend: series.iter().map(|s| s.model).collect(),
            series,
        };

        let path = self.chart_path(event);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &spec)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(path)
    }
}

/// True when `path` is a chart artifact this exporter produced.
pub fn is_chart_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("chart_event") && n.ends_with(".json"))
        .unwrap_or(false)
}
