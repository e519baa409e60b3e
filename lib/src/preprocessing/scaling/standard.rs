//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the standard deviation.
//!
//! # Example
//! ```ignore
//! use parcel_price::preprocessing::{FittedTransformer, Transformer, StandardScaler};
//!
//! let fitted = StandardScaler::new().fit(&data)?;
//! let scaled = fitted.transform(&data)?;
//! ```

use crate::error::{Error, Result, SchemaMismatch};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::stats;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    names: Vec<String>,
}

impl StandardScaler {
    /// Create a new StandardScaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach column names, reported by `feature_names_out`.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Array2<f64>) -> Result<FittedStandardScaler> {
        let cols = data.ncols();
        if data.nrows() == 0 {
            return Err(Error::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }
        if !self.names.is_empty() && self.names.len() != cols {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.names.len(),
                got: cols,
            }
            .into());
        }

        let mut mean = Vec::with_capacity(cols);
        let mut std = Vec::with_capacity(cols);
        for column in data.axis_iter(Axis(1)) {
            let values: Vec<f64> = column.iter().copied().collect();
            mean.push(match stats::mean(&values) {
                Some(m) if m.is_finite() => m,
                _ => 0.0,
            });
            // Constant (or non-finite) features keep unit scale.
            std.push(match stats::std_dev(&values) {
                Some(s) if s.is_finite() && s > 0.0 => s,
                _ => 1.0,
            });
        }

        Ok(FittedStandardScaler {
            mean,
            std,
            names: self.names.clone(),
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
    names: Vec<String>,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Number of features seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    /// Undo the scaling.
    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        let mut result = data.clone();
        for (col, mut column) in result.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.mean[col], self.std[col]);
            column.mapv_inplace(|v| v * s + m);
        }
        Ok(result)
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.std.len() != self.mean.len() {
            return Err(format!(
                "scaler holds {} means and {} deviations",
                self.mean.len(),
                self.std.len()
            ));
        }
        if !self.names.is_empty() && self.names.len() != self.mean.len() {
            return Err(format!(
                "{} scaler names for {} columns",
                self.names.len(),
                self.mean.len()
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("scaler mean is not finite".to_string());
        }
        if self.std.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err("scaler deviation is not a positive number".to_string());
        }
        Ok(())
    }

    fn check_width(&self, data: &Array2<f64>) -> Result<()> {
        if data.ncols() != self.mean.len() {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.mean.len(),
                got: data.ncols(),
            }
            .into());
        }
        Ok(())
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        let mut result = data.clone();
        for (col, mut column) in result.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.mean[col], self.std[col]);
            column.mapv_inplace(|v| (v - m) / s);
        }
        Ok(result)
    }

    fn feature_names_out(&self) -> Vec<String> {
        if self.names.is_empty() {
            (0..self.mean.len()).map(|i| format!("x{i}")).collect()
        } else {
            self.names.clone()
        }
    }

    fn n_features_out(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn create_test_data() -> Array2<f64> {
        array![[0.0, 1.0], [0.0, 1.0], [1.0, 3.0]]
    }

    #[test]
    fn test_standard_scaler_fit() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();

        // Mean: [1/3, 5/3]
        assert_abs_diff_eq!(fitted.mean()[0], 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fitted.mean()[1], 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standard_scaler_transform() {
        let data = create_test_data();
        let transformed = StandardScaler::new().fit_transform(&data).unwrap();

        for column in transformed.axis_iter(Axis(1)) {
            let values: Vec<f64> = column.to_vec();
            assert_abs_diff_eq!(stats::mean(&values).unwrap(), 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(stats::std_dev(&values).unwrap(), 1.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_standard_scaler_inverse_transform() {
        let data = create_test_data();
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let recovered = fitted
            .inverse_transform(&fitted.transform(&data).unwrap())
            .unwrap();

        for (o, r) in data.iter().zip(recovered.iter()) {
            assert_abs_diff_eq!(o, r, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let data = array![[5.0, 1.0], [5.0, 2.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();
        assert_eq!(fitted.std()[0], 1.0);
        let transformed = fitted.transform(&data).unwrap();
        assert_eq!(transformed[[0, 0]], 0.0);
        assert_eq!(transformed[[1, 0]], 0.0);
    }

    #[test]
    fn test_standard_scaler_feature_mismatch() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();
        assert!(matches!(
            fitted.transform(&array![[1.0, 2.0, 3.0]]),
            Err(Error::SchemaMismatch(SchemaMismatch::FeatureCount { expected: 2, got: 3 }))
        ));
    }

    #[test]
    fn test_standard_scaler_empty_data() {
        assert!(matches!(
            StandardScaler::new().fit(&Array2::zeros((0, 2))),
            Err(Error::EmptyData(_))
        ));
    }
}
