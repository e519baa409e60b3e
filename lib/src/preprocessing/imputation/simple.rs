//! Simple Imputer.
//!
//! Imputation transformer for completing missing values.
//! Supports mean, median and constant strategies.
//!
//! Note: This implementation treats NaN (and other non-finite values) as missing.
//!
//! # Example
//! ```ignore
//! use parcel_price::preprocessing::{Transformer, FittedTransformer, SimpleImputer, ImputeStrategy};
//!
//! let imputer = SimpleImputer::new(ImputeStrategy::Median);
//! let fitted = imputer.fit(&data)?;
//! let imputed = fitted.transform(&data)?;
//! ```

use crate::error::{Error, Result, SchemaMismatch};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::stats;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Strategy for imputing missing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Replace missing values with the mean of each column.
    Mean,
    /// Replace missing values with the median of each column.
    #[default]
    Median,
    /// Replace missing values with a constant value.
    Constant(f64),
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    names: Vec<String>,
}

impl SimpleImputer {
    /// Create a new SimpleImputer with the specified strategy.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            names: Vec::new(),
        }
    }

    /// Attach column names, reported by `feature_names_out`.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedSimpleImputer {
    strategy: ImputeStrategy,
    /// Fill value for each feature.
    statistics: Vec<f64>,
    names: Vec<String>,
}

impl FittedSimpleImputer {
    /// Get the imputation statistics (fill values) for each feature.
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    /// Strategy the statistics were computed with.
    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    /// Number of features seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.statistics.len()
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if !self.names.is_empty() && self.names.len() != self.statistics.len() {
            return Err(format!(
                "{} imputer names for {} fill values",
                self.names.len(),
                self.statistics.len()
            ));
        }
        if self.statistics.iter().any(|v| !v.is_finite()) {
            return Err("imputer fill value is not finite".to_string());
        }
        Ok(())
    }
}

/// Compute fill values, ignoring missing cells. A column with no observed
/// value falls back to 0.
fn compute_statistics(data: &Array2<f64>, strategy: ImputeStrategy) -> Vec<f64> {
    data.axis_iter(Axis(1))
        .map(|column| {
            let values: Vec<f64> = column.iter().copied().collect();
            match strategy {
                ImputeStrategy::Mean => stats::mean(&values),
                ImputeStrategy::Median => stats::median(&values),
                ImputeStrategy::Constant(value) => Some(value),
            }
            .unwrap_or(0.0)
        })
        .collect()
}

impl Transformer for SimpleImputer {
    type Input = Array2<f64>;
    type Fitted = FittedSimpleImputer;

    fn fit(&self, data: &Array2<f64>) -> Result<FittedSimpleImputer> {
        if data.nrows() == 0 {
            return Err(Error::EmptyData(
                "Cannot fit SimpleImputer on empty data".to_string(),
            ));
        }
        if !self.names.is_empty() && self.names.len() != data.ncols() {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.names.len(),
                got: data.ncols(),
            }
            .into());
        }

        Ok(FittedSimpleImputer {
            strategy: self.strategy,
            statistics: compute_statistics(data, self.strategy),
            names: self.names.clone(),
        })
    }
}

impl FittedTransformer for FittedSimpleImputer {
    type Input = Array2<f64>;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.statistics.len() {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.statistics.len(),
                got: data.ncols(),
            }
            .into());
        }

        let mut result = data.clone();
        for (mut column, &fill) in result.axis_iter_mut(Axis(1)).zip(&self.statistics) {
            column.mapv_inplace(|v| if v.is_finite() { v } else { fill });
        }
        Ok(result)
    }

    fn feature_names_out(&self) -> Vec<String> {
        if self.names.is_empty() {
            (0..self.statistics.len()).map(|i| format!("x{i}")).collect()
        } else {
            self.names.clone()
        }
    }

    fn n_features_out(&self) -> usize {
        self.statistics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn data_with_missing() -> Array2<f64> {
        // [[1, NaN], [3, 4], [5, 6], [7, 10]]
        array![[1.0, f64::NAN], [3.0, 4.0], [5.0, 6.0], [7.0, 10.0]]
    }

    #[test]
    fn test_simple_imputer_median_is_default() {
        let fitted = SimpleImputer::default().fit(&data_with_missing()).unwrap();
        assert_eq!(fitted.strategy(), ImputeStrategy::Median);

        // Column 0: median of [1, 3, 5, 7] = 4
        // Column 1: median of [4, 6, 10] = 6
        assert_relative_eq!(fitted.statistics()[0], 4.0);
        assert_relative_eq!(fitted.statistics()[1], 6.0);

        let imputed = fitted.transform(&data_with_missing()).unwrap();
        assert_relative_eq!(imputed[[0, 1]], 6.0);
        assert_relative_eq!(imputed[[1, 1]], 4.0);
    }

    #[test]
    fn test_simple_imputer_mean() {
        let fitted = SimpleImputer::new(ImputeStrategy::Mean)
            .fit(&data_with_missing())
            .unwrap();
        assert_relative_eq!(fitted.statistics()[0], 4.0);
        assert_relative_eq!(fitted.statistics()[1], 20.0 / 3.0);
    }

    #[test]
    fn test_simple_imputer_constant() {
        let fitted = SimpleImputer::new(ImputeStrategy::Constant(-1.0))
            .fit(&data_with_missing())
            .unwrap();
        let imputed = fitted.transform(&data_with_missing()).unwrap();
        assert_relative_eq!(imputed[[0, 1]], -1.0);
        assert_relative_eq!(imputed[[0, 0]], 1.0);
    }

    #[test]
    fn test_simple_imputer_all_missing_column_fills_zero() {
        let data = array![[f64::NAN, 1.0], [f64::NAN, 2.0]];
        let fitted = SimpleImputer::default().fit(&data).unwrap();
        assert_eq!(fitted.statistics()[0], 0.0);
        assert!(fitted.transform(&data).unwrap().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_simple_imputer_feature_mismatch() {
        let fitted = SimpleImputer::default().fit(&data_with_missing()).unwrap();
        let result = fitted.transform(&array![[1.0, 2.0, 3.0]]);
        assert!(matches!(
            result,
            Err(Error::SchemaMismatch(SchemaMismatch::FeatureCount { expected: 2, got: 3 }))
        ));
    }

    #[test]
    fn test_simple_imputer_empty_data() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            SimpleImputer::default().fit(&data),
            Err(Error::EmptyData(_))
        ));
    }

    #[test]
    fn test_impute_strategy_json() {
        let strategy: ImputeStrategy = serde_json::from_str("\"mean\"").unwrap();
        assert_eq!(strategy, ImputeStrategy::Mean);
        let strategy: ImputeStrategy = serde_json::from_str("{\"constant\": 2.5}").unwrap();
        assert_eq!(strategy, ImputeStrategy::Constant(2.5));
    }
}
