//! Ordinal encoding for high-cardinality categorical columns.
//!
//! Maps categorical values to integer ordinals (0, 1, 2, ...).

use super::{category_of, UNKNOWN_ORDINAL};
use crate::dataset::Frame;
use crate::error::{Error, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordinal encoder for categorical columns.
///
/// Maps each category seen during fitting to an integer code. Codes follow
/// the lexicographic order of the categories; a category not seen during
/// fitting encodes as [`UNKNOWN_ORDINAL`].
///
/// # Example
/// ```ignore
/// // city: ["Tver", "Kazan", "Tver"]
/// let fitted = OrdinalEncoder::new(vec!["city".into()], "__missing__").fit(&frame)?;
/// // [[1], [0], [1]]
/// let encoded = fitted.transform(&frame)?;
/// ```
#[derive(Clone, Debug)]
pub struct OrdinalEncoder {
    columns: Vec<String>,
    missing_category: String,
}

impl OrdinalEncoder {
    /// Create an encoder for the given columns.
    pub fn new(columns: Vec<String>, missing_category: impl Into<String>) -> Self {
        Self {
            columns,
            missing_category: missing_category.into(),
        }
    }
}

/// Fitted OrdinalEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedOrdinalEncoder {
    /// Encoded columns.
    columns: Vec<String>,
    /// Mapping from category to ordinal for each column.
    mappings: Vec<BTreeMap<String, usize>>,
    /// Placeholder for missing cells.
    missing_category: String,
}

impl FittedOrdinalEncoder {
    /// Get the mapping (category -> ordinal) for a specific column.
    pub fn mapping(&self, column_idx: usize) -> Option<&BTreeMap<String, usize>> {
        self.mappings.get(column_idx)
    }

    /// Encoded column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.mappings.len() != self.columns.len() {
            return Err(format!(
                "{} ordinal mappings for {} columns",
                self.mappings.len(),
                self.columns.len()
            ));
        }
        Ok(())
    }

    /// Code for one raw value of one column.
    pub fn encode(&self, column_idx: usize, value: &Option<String>) -> f64 {
        let cat = category_of(value, &self.missing_category);
        self.mappings
            .get(column_idx)
            .and_then(|mapping| mapping.get(cat))
            .map_or(UNKNOWN_ORDINAL, |&code| code as f64)
    }
}

impl Transformer for OrdinalEncoder {
    type Input = Frame;
    type Fitted = FittedOrdinalEncoder;

    fn fit(&self, frame: &Frame) -> Result<FittedOrdinalEncoder> {
        if frame.is_empty() {
            return Err(Error::EmptyData(
                "Cannot fit OrdinalEncoder on empty data".to_string(),
            ));
        }

        let mut mappings = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = frame.categorical(column)?;
            let mut mapping: BTreeMap<String, usize> = values
                .iter()
                .map(|v| (category_of(v, &self.missing_category).to_string(), 0))
                .collect();
            // BTreeMap iterates in sorted order, so codes follow category order.
            for (code, slot) in mapping.values_mut().enumerate() {
                *slot = code;
            }
            mappings.push(mapping);
        }

        Ok(FittedOrdinalEncoder {
            columns: self.columns.clone(),
            mappings,
            missing_category: self.missing_category.clone(),
        })
    }
}

impl FittedTransformer for FittedOrdinalEncoder {
    type Input = Frame;

    fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        let rows = frame.n_rows();
        let mut result = Array2::zeros((rows, self.columns.len()));

        for (col, column) in self.columns.iter().enumerate() {
            let values = frame.categorical(column)?;
            for (row, value) in values.iter().enumerate() {
                result[[row, col]] = self.encode(col, value);
            }
        }

        Ok(result)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn n_features_out(&self) -> usize {
        self.columns.len()
    }
}
