//! Dataset loading
//!
//! CSV ingestion goes through Polars; the frame is then flattened into the
//! row-major matrix the rest of the pipeline works on.

use crate::dataset::Dataset;
use crate::error::{EvalError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loads labeled instance collections from disk.
pub struct DatasetLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }

    /// Load a headered CSV file into a dataset. All columns are cast to
    /// `f64`; the class column is pinned by name.
    pub fn load_csv(&self, path: &Path, class_column: &str) -> Result<Dataset> {
        let file = File::open(path).map_err(|e| {
            EvalError::DataError(format!("cannot open {}: {e}", path.display()))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| EvalError::DataError(e.to_string()))?;

        Self::frame_to_dataset(&df, class_column)
    }

    /// Flatten a DataFrame into a row-major matrix plus schema.
    pub fn frame_to_dataset(df: &DataFrame, class_column: &str) -> Result<Dataset> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let class_index = names
            .iter()
            .position(|n| n == class_column)
            .ok_or_else(|| {
                EvalError::ConfigError(format!("class column {class_column:?} not in dataset"))
            })?;

        let n_rows = df.height();
        let n_cols = names.len();

        let col_data: Vec<Vec<f64>> = names
            .iter()
            .map(|name| {
                let column = df
                    .column(name)
                    .map_err(|_| EvalError::AttributeNotFound(name.clone()))?;
                let as_f64 = column
                    .cast(&DataType::Float64)
                    .map_err(|e| EvalError::DataError(e.to_string()))?;
                let values: Vec<f64> = as_f64
                    .f64()
                    .map_err(|e| EvalError::DataError(e.to_string()))?
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect();
                Ok(values)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        let values = Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]);

        Dataset::new(values, names, class_index)
    }
}
