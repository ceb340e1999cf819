//! Labeled instance collection with an explicit class attribute
//!
//! A `Dataset` is an instances-by-attributes matrix plus the attribute
//! schema. Nominal values (event labels, class labels) are stored as
//! integral `f64`. The class attribute index is explicit and is only moved
//! at dataset-preparation boundaries; every preparation step re-pins it to
//! the last position before handing the dataset onward.

use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Ordered sequence of instances sharing one attribute schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    values: Array2<f64>,
    attributes: Vec<String>,
    class_index: usize,
}

impl Dataset {
    /// Build a dataset from a full value matrix and its schema.
    pub fn new(values: Array2<f64>, attributes: Vec<String>, class_index: usize) -> Result<Self> {
        if values.ncols() != attributes.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} attribute columns", attributes.len()),
                actual: format!("{} columns", values.ncols()),
            });
        }
        if class_index >= attributes.len() {
            return Err(EvalError::ConfigError(format!(
                "class index {} out of range for {} attributes",
                class_index,
                attributes.len()
            )));
        }
        Ok(Self {
            values,
            attributes,
            class_index,
        })
    }

    /// Assemble a dataset from a feature matrix and a class vector, placing
    /// the class attribute last. Used after resampling rebuilds instances.
    pub fn from_features(
        x: &Array2<f64>,
        y: &Array1<i64>,
        feature_names: &[String],
        class_name: &str,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(EvalError::ShapeError {
                expected: format!("{} class values", x.nrows()),
                actual: format!("{} class values", y.len()),
            });
        }
        let n_rows = x.nrows();
        let n_features = x.ncols();
        let values = Array2::from_shape_fn((n_rows, n_features + 1), |(i, j)| {
            if j < n_features {
                x[[i, j]]
            } else {
                y[i] as f64
            }
        });
        let mut attributes: Vec<String> = feature_names.to_vec();
        attributes.push(class_name.to_string());
        Self::new(values, attributes, n_features)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_instances(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_attributes(&self) -> usize {
        self.values.ncols()
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn class_name(&self) -> &str {
        &self.attributes[self.class_index]
    }

    /// Index of a named attribute, if present.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    /// Names of all non-class attributes, in schema order.
    pub fn feature_names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.class_index)
            .map(|(_, a)| a.clone())
            .collect()
    }

    /// Non-class columns as an instances-by-features matrix.
    pub fn feature_matrix(&self) -> Array2<f64> {
        let cols: Vec<usize> = (0..self.n_attributes())
            .filter(|&j| j != self.class_index)
            .collect();
        Array2::from_shape_fn((self.n_instances(), cols.len()), |(i, j)| {
            self.values[[i, cols[j]]]
        })
    }

    /// Class column as continuous values.
    pub fn class_values(&self) -> Array1<f64> {
        self.values.column(self.class_index).to_owned()
    }

    /// Class column rounded to nominal labels.
    pub fn class_labels(&self) -> Array1<i64> {
        self.values
            .column(self.class_index)
            .iter()
            .map(|&v| v.round() as i64)
            .collect()
    }

    /// Instance count per class label, in ascending label order.
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for label in self.class_labels().iter() {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }

    /// Instances whose `column`-th attribute rounds to `label`, schema and
    /// instance order preserved.
    pub fn filter_by_label(&self, column: usize, label: i64) -> Result<Dataset> {
        if column >= self.n_attributes() {
            return Err(EvalError::AttributeNotFound(format!(
                "attribute index {column}"
            )));
        }
        let rows: Vec<usize> = (0..self.n_instances())
            .filter(|&i| self.values[[i, column]].round() as i64 == label)
            .collect();
        let values = Array2::from_shape_fn((rows.len(), self.n_attributes()), |(i, j)| {
            self.values[[rows[i], j]]
        });
        Dataset::new(values, self.attributes.clone(), self.class_index)
    }

    /// Project onto the named feature attributes plus the class attribute,
    /// which is re-pinned to the last position.
    pub fn project(&self, feature_attrs: &[String]) -> Result<Dataset> {
        let mut cols = Vec::with_capacity(feature_attrs.len() + 1);
        for name in feature_attrs {
            let idx = self
                .attribute_index(name)
                .ok_or_else(|| EvalError::AttributeNotFound(name.clone()))?;
            if idx == self.class_index {
                return Err(EvalError::SelectionError(format!(
                    "class attribute {name:?} selected as a feature"
                )));
            }
            cols.push(idx);
        }
        if cols.is_empty() {
            return Err(EvalError::SelectionError(
                "no feature attributes selected".to_string(),
            ));
        }
        cols.push(self.class_index);

        let values = Array2::from_shape_fn((self.n_instances(), cols.len()), |(i, j)| {
            self.values[[i, cols[j]]]
        });
        let attributes: Vec<String> = cols.iter().map(|&j| self.attributes[j].clone()).collect();
        Dataset::new(values, attributes, cols.len() - 1)
    }

    /// Project by positional feature indices (indices into the feature
    /// matrix, not the full schema). Class attribute stays last.
    pub fn project_feature_indices(&self, indices: &[usize]) -> Result<Dataset> {
        let names = self.feature_names();
        let selected: Result<Vec<String>> = indices
            .iter()
            .map(|&i| {
                names
                    .get(i)
                    .cloned()
                    .ok_or_else(|| EvalError::AttributeNotFound(format!("feature index {i}")))
            })
            .collect();
        self.project(&selected?)
    }
}
