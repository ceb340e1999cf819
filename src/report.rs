//! Appending accuracy report
//!
//! The report is a plain text stream opened in append mode. Each run adds a
//! preamble, then per partition one header line of model names in panel
//! order followed by one comma-separated row of 3-decimal accuracies per
//! completed feature-strategy. Skipped rows leave no trace; a row is written
//! only once all eight values exist.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{EvalError, Result};
use crate::models::ModelKind;

pub struct ReportWriter {
    writer: BufWriter<std::fs::File>,
    path: PathBuf,
}

impl ReportWriter {
    /// Opens the report in append mode and writes the run preamble.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(b"\n\nClassification Results\n")?;
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a partition header: model names in panel order.
    pub fn write_header(&mut self) -> Result<()> {
        for model in ModelKind::PANEL {
            write!(self.writer, "{},", model.name())?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Writes one complete feature-strategy row. Rejects partial rows so a
    /// half-evaluated strategy can never leak into the report.
    pub fn write_row(&mut self, accuracies: &[f64]) -> Result<()> {
        if accuracies.len() != ModelKind::PANEL.len() {
            return Err(EvalError::ConfigError(format!(
                "report row has {} values, panel has {}",
                accuracies.len(),
                ModelKind::PANEL.len()
            )));
        }
        for acc in accuracies {
            write!(self.writer, "{acc:.3},")?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for ReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
