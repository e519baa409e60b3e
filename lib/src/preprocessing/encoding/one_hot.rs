//! One-hot encoding for low-cardinality categorical columns.

use super::category_of;
use crate::dataset::Frame;
use crate::error::{Error, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One-hot encoder for categorical columns.
///
/// Each configured column is expanded into one indicator per category seen
/// during fitting, in first-seen order. A category that was not seen during
/// fitting encodes as an all-zero block.
///
/// # Example
/// ```ignore
/// // realty_type: ["office", "retail", "office"]
/// let fitted = OneHotEncoder::new(vec!["realty_type".into()], "__missing__").fit(&frame)?;
/// // [[1, 0], [0, 1], [1, 0]]
/// let encoded = fitted.transform(&frame)?;
/// ```
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    missing_category: String,
}

impl OneHotEncoder {
    /// Create an encoder for the given columns.
    pub fn new(columns: Vec<String>, missing_category: impl Into<String>) -> Self {
        Self {
            columns,
            missing_category: missing_category.into(),
        }
    }
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    /// Encoded columns.
    columns: Vec<String>,
    /// Categories for each column, in first-seen order.
    categories: Vec<Vec<String>>,
    /// Placeholder for missing cells.
    missing_category: String,
    /// Total number of output features (sum of category counts).
    n_features_out: usize,
}

impl FittedOneHotEncoder {
    /// Get the categories learned for each column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Encoded column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.categories.len() != self.columns.len() {
            return Err(format!(
                "{} one-hot vocabularies for {} columns",
                self.categories.len(),
                self.columns.len()
            ));
        }
        let total: usize = self.categories.iter().map(Vec::len).sum();
        if total != self.n_features_out {
            return Err(format!(
                "one-hot width {} but vocabularies hold {total} categories",
                self.n_features_out
            ));
        }
        Ok(())
    }
}

impl Transformer for OneHotEncoder {
    type Input = Frame;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, frame: &Frame) -> Result<FittedOneHotEncoder> {
        if frame.is_empty() {
            return Err(Error::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut categories = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = frame.categorical(column)?;
            let mut seen = HashSet::new();
            let mut ordered = Vec::new();
            for value in values {
                let cat = category_of(value, &self.missing_category);
                if seen.insert(cat) {
                    ordered.push(cat.to_string());
                }
            }
            categories.push(ordered);
        }

        let n_features_out = categories.iter().map(Vec::len).sum();
        Ok(FittedOneHotEncoder {
            columns: self.columns.clone(),
            categories,
            missing_category: self.missing_category.clone(),
            n_features_out,
        })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = Frame;

    fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        let rows = frame.n_rows();
        let mut result = Array2::zeros((rows, self.n_features_out));

        let mut offset = 0;
        for (column, cats) in self.columns.iter().zip(&self.categories) {
            let values = frame.categorical(column)?;
            for (row, value) in values.iter().enumerate() {
                let cat = category_of(value, &self.missing_category);
                // Unknown categories leave the block at zero.
                if let Some(idx) = cats.iter().position(|c| c == cat) {
                    result[[row, offset + idx]] = 1.0;
                }
            }
            offset += cats.len();
        }

        Ok(result)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |cat| format!("{column}={cat}")))
            .collect()
    }

    fn n_features_out(&self) -> usize {
        self.n_features_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaMismatch;

    fn frame(values: Vec<Option<&str>>) -> Frame {
        Frame::new().with_categorical("kind", values).unwrap()
    }

    fn encoder() -> OneHotEncoder {
        OneHotEncoder::new(vec!["kind".to_string()], "__missing__")
    }

    #[test]
    fn test_one_hot_encoder_first_seen_order() {
        let data = frame(vec![Some("retail"), Some("office"), Some("retail")]);
        let fitted = encoder().fit(&data).unwrap();

        assert_eq!(fitted.categories()[0], vec!["retail", "office"]);
        assert_eq!(fitted.n_features_out(), 2);

        let encoded = fitted.transform(&data).unwrap();
        assert_eq!(
            encoded,
            ndarray::array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]]
        );
    }

    #[test]
    fn test_one_hot_encoder_unknown_is_all_zero() {
        let fitted = encoder().fit(&frame(vec![Some("X")])).unwrap();
        let encoded = fitted.transform(&frame(vec![Some("Y")])).unwrap();
        assert_eq!(encoded, ndarray::array![[0.0]]);
    }

    #[test]
    fn test_one_hot_encoder_missing_is_own_category() {
        let fitted = encoder().fit(&frame(vec![Some("X"), None])).unwrap();
        assert_eq!(fitted.categories()[0], vec!["X", "__missing__"]);
        let encoded = fitted.transform(&frame(vec![None])).unwrap();
        assert_eq!(encoded, ndarray::array![[0.0, 1.0]]);
    }

    #[test]
    fn test_one_hot_encoder_feature_names() {
        let fitted = encoder()
            .fit(&frame(vec![Some("office"), Some("retail")]))
            .unwrap();
        assert_eq!(
            fitted.feature_names_out(),
            vec!["kind=office", "kind=retail"]
        );
    }

    #[test]
    fn test_one_hot_encoder_empty_data() {
        let data = Frame::new()
            .with_categorical("kind", Vec::<Option<String>>::new())
            .unwrap();
        assert!(matches!(encoder().fit(&data), Err(Error::EmptyData(_))));
    }

    #[test]
    fn test_one_hot_encoder_missing_column() {
        let fitted = encoder().fit(&frame(vec![Some("X")])).unwrap();
        let other = Frame::new()
            .with_categorical("other", vec![Some("X")])
            .unwrap();
        assert!(matches!(
            fitted.transform(&other),
            Err(Error::SchemaMismatch(SchemaMismatch::MissingColumn(_)))
        ));
    }

    #[test]
    fn test_one_hot_encoder_empty_transform() {
        let fitted = encoder().fit(&frame(vec![Some("a"), Some("b")])).unwrap();
        let empty = Frame::new()
            .with_categorical("kind", Vec::<Option<String>>::new())
            .unwrap();
        assert_eq!(fitted.transform(&empty).unwrap().dim(), (0, 2));
    }
}
